//! CLI command implementations.

use crate::KindArg;
use colored::Colorize;
use std::path::Path;
use trellis_core::{uri, EntityKind, LinkKind, Uid};
use trellis_graph::{SledStore, TopicHandle, TopicService};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

impl From<KindArg> for LinkKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Child => LinkKind::Child,
            KindArg::Rating => LinkKind::Rating,
            KindArg::Reference => LinkKind::Reference,
        }
    }
}

fn open(db: &Path) -> Result<TopicService<SledStore>> {
    let store = SledStore::open(db)?;
    Ok(TopicService::open(store)?)
}

/// Resolves a topic by name, failing if it is not registered.
fn resolve(service: &TopicService<SledStore>, name: &str) -> Result<TopicHandle<SledStore>> {
    let topic_uri = uri::generate(EntityKind::Topic, name);
    service
        .get(&topic_uri)
        .ok_or_else(|| format!("no topic named \"{name}\"").into())
}

/// Parses a link target: a bare topic name, or a full resource URI.
fn parse_target(service: &TopicService<SledStore>, to: &str) -> Result<Uid> {
    if to.contains('/') {
        Ok(Uid::from_uri(to)?)
    } else {
        let topic = service.find_or_create(to)?;
        Ok(Uid::Topic(topic.topic().clone()))
    }
}

pub fn add(db: &Path, name: &str) -> Result<()> {
    let service = open(db)?;
    let existed = service.has_topic(name);
    let topic = service.find_or_create(name)?;
    if existed {
        println!("{} {} already exists", "✓".green(), topic.uri().cyan());
    } else {
        println!("{} Created {}", "✓".green(), topic.uri().cyan());
    }
    Ok(())
}

pub fn list(db: &Path) -> Result<()> {
    let service = open(db)?;
    let topics = service.topics();
    if topics.is_empty() {
        println!("No topics yet. Run {} to create one.", "trellis add".cyan());
        return Ok(());
    }
    for topic in topics {
        println!("{}  {}", topic.uri().cyan(), topic.name());
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn link(
    db: &Path,
    from: &str,
    to: &str,
    kind: Option<KindArg>,
    comment: Option<String>,
    quote: Option<String>,
    rate: Option<f32>,
) -> Result<()> {
    let service = open(db)?;
    let source = resolve(&service, from)?;
    let target = parse_target(&service, to)?;
    let link = source.link(kind.map(Into::into), target, comment, quote, rate)?;
    println!(
        "{} Linked {} {} {}",
        "✓".green(),
        source.uri().cyan(),
        link.kind
            .map(|k| k.to_string())
            .unwrap_or_else(|| "related".to_string()),
        link.to.uri().cyan()
    );
    Ok(())
}

pub fn add_child(db: &Path, parent: &str, child: &str) -> Result<()> {
    let service = open(db)?;
    let parent = resolve(&service, parent)?;
    parent.add_child(child)?;
    println!(
        "{} {} now has child {}",
        "✓".green(),
        parent.name().cyan(),
        child.cyan()
    );
    Ok(())
}

pub fn unlink(db: &Path, from: &str, to: &str) -> Result<()> {
    let service = open(db)?;
    let source = resolve(&service, from)?;
    source.unlink(to)?;
    println!(
        "{} Unlinked {} from {}",
        "✓".green(),
        to.cyan(),
        source.name().cyan()
    );
    Ok(())
}

fn print_topics(label: &str, topics: &[TopicHandle<SledStore>]) {
    if topics.is_empty() {
        println!("({label}: none)");
        return;
    }
    for topic in topics {
        println!("{}  {}", topic.uri().cyan(), topic.name());
    }
}

pub fn children(db: &Path, name: &str) -> Result<()> {
    let service = open(db)?;
    let topic = resolve(&service, name)?;
    print_topics("children", &topic.children());
    Ok(())
}

pub fn parents(db: &Path, name: &str) -> Result<()> {
    let service = open(db)?;
    let topic = resolve(&service, name)?;
    print_topics("parents", &topic.parents());
    Ok(())
}

pub fn related(db: &Path, name: &str) -> Result<()> {
    let service = open(db)?;
    let topic = resolve(&service, name)?;
    print_topics("related", &topic.related());
    Ok(())
}

pub fn resources(db: &Path, name: &str, json: bool) -> Result<()> {
    let service = open(db)?;
    let topic = resolve(&service, name)?;
    let resources = topic.resources();

    if json {
        println!("{}", serde_json::to_string_pretty(&resources)?);
        return Ok(());
    }

    if resources.is_empty() {
        println!("No resources attached to {}", topic.name().cyan());
        return Ok(());
    }
    let sections = [
        ("video", &resources.video),
        ("item", &resources.item),
        ("items-range", &resources.items_range),
        ("document", &resources.document),
    ];
    for (label, attached) in sections {
        if attached.is_empty() {
            continue;
        }
        println!("{}:", label.bold());
        for entry in attached {
            let mut line = format!("  {}", entry.resource.uri().cyan());
            if let Some(comment) = &entry.link.comment {
                line.push_str(&format!("  - {comment}"));
            }
            if let Some(rate) = entry.link.rate {
                line.push_str(&format!("  [{rate}]"));
            }
            println!("{line}");
        }
    }
    Ok(())
}

pub fn merge(db: &Path, from: &str, into: &str) -> Result<()> {
    let service = open(db)?;
    let source = resolve(&service, from)?;
    let target = source.merge(into)?;
    println!(
        "{} Merged {} into {} (original links kept)",
        "✓".green(),
        from.cyan(),
        target.name().cyan()
    );
    Ok(())
}

pub fn delete(db: &Path, name: &str) -> Result<()> {
    let service = open(db)?;
    let topic = resolve(&service, name)?;
    topic.delete()?;
    println!("{} Deleted {}", "✓".green(), name.cyan());
    Ok(())
}

pub fn stats(db: &Path) -> Result<()> {
    let service = open(db)?;
    let stats = service.stats();
    println!("{}", "Graph statistics".bold());
    println!("  topics: {}", stats.topics.to_string().cyan());
    println!("  links:  {}", stats.links.to_string().cyan());
    Ok(())
}
