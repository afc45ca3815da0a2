//! The route subcommand

// this_file: crates/vellum-cli/src/commands/route.rs

use anyhow::{bail, Context};
use vellum_cluster::router::resolve_shard;
use vellum_cluster::{ClusterMetadata, ClusterView};
use vellum_core::{CollectionInfo, Value, KEY_ATTRIBUTE};

use crate::cli::RouteArgs;

pub fn run(args: &RouteArgs) -> anyhow::Result<()> {
    let layout = std::fs::read_to_string(&args.layout)
        .with_context(|| format!("cannot read {}", args.layout.display()))?;
    let collections: Vec<CollectionInfo> =
        serde_json::from_str(&layout).context("layout is not a JSON array of collections")?;

    let mut view = ClusterView::new();
    for info in collections {
        view = view.with_collection(&args.database, info);
    }
    let metadata = ClusterMetadata::new_local();
    metadata.install_view(view);

    let Some(info) = metadata.get_collection(&args.database, &args.collection) else {
        bail!(
            "collection {} not present in {}",
            args.collection,
            args.layout.display()
        );
    };

    let document = match &args.key {
        Some(key) => Value::object([(KEY_ATTRIBUTE.to_owned(), Value::from(key.as_str()))]),
        None => super::read_document(args.document.as_deref())?,
    };

    let (shard, uses_default) = resolve_shard(&info, &document);
    println!(
        "sharding attributes: {:?}{}",
        info.sharding_attributes,
        if uses_default { " (default)" } else { "" }
    );
    match shard {
        Some(shard) => {
            let server = info.shards.get(&shard).map(String::as_str).unwrap_or("?");
            println!("shard:  {shard}");
            println!("server: {server}");
        }
        None => bail!("no shard responsible (empty shard table)"),
    }
    Ok(())
}
