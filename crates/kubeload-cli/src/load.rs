//! # Load Subcommand
//!
//! `kubeload load PATH` builds every manifest under PATH and prints one
//! line per object, or the whole object tree with `--tree`.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use kubeload_core::{CastValue, Object, TypeRegistry};
use kubeload_loader::{LoaderConfig, ManifestLoader, RenderContext, RenderError};
use serde_yaml::Value;

/// Arguments for the load subcommand.
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Manifest file or directory.
    pub path: PathBuf,

    /// Build the single document in PATH as this type instead of
    /// resolving its apiVersion/kind.
    #[arg(long = "type", value_name = "TYPE")]
    pub type_name: Option<String>,

    /// Print every field of each object.
    #[arg(long)]
    pub tree: bool,

    /// Template variable; `${NAME}` in manifests is replaced by VALUE.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// Skip documents of unknown type instead of failing.
    #[arg(long)]
    pub skip_unresolved: bool,

    /// Deepest nested-object level allowed.
    #[arg(long)]
    pub max_depth: Option<usize>,
}

impl LoadArgs {
    /// Apply flag overrides on top of a file or default configuration.
    pub fn apply_overrides(&self, mut config: LoaderConfig) -> LoaderConfig {
        if self.skip_unresolved {
            config.skip_unresolved = true;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        config
    }
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}

/// Run `load`, writing the report to `out`.
pub fn run(
    args: &LoadArgs,
    registry: &TypeRegistry,
    config: LoaderConfig,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let config = args.apply_overrides(config);
    let mut loader = ManifestLoader::with_config(registry, config);
    if !args.vars.is_empty() {
        for (name, value) in &args.vars {
            loader = loader.with_var(name.as_str(), value.as_str());
        }
        loader = loader.with_renderer_fn(substitute);
    }

    let objects = match &args.type_name {
        Some(type_name) => vec![loader.load_type(type_name, &args.path)?],
        None => loader
            .load(&args.path)
            .with_context(|| format!("loading {}", args.path.display()))?,
    };

    for object in &objects {
        writeln!(out, "{}", summary(object))?;
        if args.tree {
            writeln!(out, "{object}")?;
        }
    }
    Ok(())
}

/// `<Type> <namespace>/<name>`, dropping parts the object does not set.
pub fn summary(object: &Object) -> String {
    let field = |name: &str| {
        object
            .get_path(&["metadata", name])
            .and_then(CastValue::as_str)
    };
    match (field("namespace"), field("name")) {
        (Some(namespace), Some(name)) => format!("{} {namespace}/{name}", object.type_name()),
        (None, Some(name)) => format!("{} {name}", object.type_name()),
        _ => object.type_name().to_string(),
    }
}

/// Replace each `${NAME}` with the variable's text.
fn substitute(template: &str, context: &RenderContext) -> Result<String, RenderError> {
    let vars: &BTreeMap<String, Value> = context.vars();
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        rendered.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| RenderError::new("unterminated '${' in template"))?;
        let name = &after[..end];
        let value = vars
            .get(name)
            .ok_or_else(|| RenderError::new(format!("undefined variable '{name}'")))?;
        match value {
            Value::String(text) => rendered.push_str(text),
            other => rendered.push_str(
                serde_yaml::to_string(other)
                    .map_err(|e| RenderError::new(e.to_string()))?
                    .trim_end(),
            ),
        }
        rest = &after[end + 1..];
    }
    rendered.push_str(rest);
    Ok(rendered)
}
