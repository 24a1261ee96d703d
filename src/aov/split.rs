use std::path::{Path, PathBuf};

use exr::prelude::*;
use smallvec::SmallVec;

use crate::aov::classify::{AovGroup, PartChannels, classify_parts, directory_name};
use crate::batch::{BatchReport, run_batch};
use crate::config::ToolConfig;
use crate::foundation::error::{ReelError, ReelResult};

type FlatImage = Image<Layers<AnyChannels<FlatSamples>>>;
type FlatLayer = Layer<AnyChannels<FlatSamples>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitOpts {
    /// Case-insensitive marker for matte channels.
    pub matte_token: String,
    /// Replace existing outputs instead of failing.
    pub overwrite: bool,
}

impl Default for SplitOpts {
    fn default() -> Self {
        Self {
            matte_token: "crypto".to_string(),
            overwrite: true,
        }
    }
}

impl SplitOpts {
    pub fn from_config(cfg: &ToolConfig) -> Self {
        Self {
            matte_token: cfg.matte_token.clone(),
            ..Self::default()
        }
    }
}

/// One file written by [`split_aovs`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitOutput {
    pub group: String,
    pub path: PathBuf,
    pub channels: Vec<String>,
    pub is_matte: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitOutcome {
    pub source: PathBuf,
    pub outputs: Vec<SplitOutput>,
}

/// Output location for a group: `<source dir>/<group>/<source file name>`.
pub fn output_path(source: &Path, group: &str) -> ReelResult<PathBuf> {
    let file_name = source
        .file_name()
        .ok_or_else(|| ReelError::validation(format!("'{}' has no file name", source.display())))?;
    let dir = match source.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok(dir.join(directory_name(group)).join(file_name))
}

/// Split one multi-channel EXR into one file per AOV group.
///
/// Matte channels from every part are written together into a single output. Every group is
/// built before anything is written, so a failing file leaves no outputs behind.
pub fn split_aovs(source: &Path, opts: &SplitOpts) -> ReelResult<SplitOutcome> {
    if !source.is_file() {
        return Err(ReelError::not_found(format!(
            "'{}' does not exist",
            source.display()
        )));
    }

    let image: FlatImage = read()
        .no_deep_data()
        .largest_resolution_level()
        .all_channels()
        .all_layers()
        .all_attributes()
        .from_file(source)
        .map_err(|e| ReelError::decode(format!("read '{}': {e}", source.display())))?;

    let parts: Vec<PartChannels> = image
        .layer_data
        .iter()
        .map(|layer| PartChannels {
            layer_name: layer.attributes.layer_name.as_ref().map(|t| t.to_string()),
            channels: layer
                .channel_data
                .list
                .iter()
                .map(|c| c.name.to_string())
                .collect(),
        })
        .collect();

    let groups = classify_parts(&parts, &opts.matte_token);
    tracing::info!(
        source = %source.display(),
        parts = parts.len(),
        groups = groups.len(),
        "splitting AOVs"
    );

    // Every group is built and checked before the first file is written.
    let mut planned = Vec::with_capacity(groups.len());
    for group in &groups {
        let layer = build_layer(&image, group)?;
        let path = output_path(source, &group.name)?;
        if !opts.overwrite && path.exists() {
            return Err(ReelError::validation(format!(
                "output file '{}' already exists",
                path.display()
            )));
        }
        planned.push((group, layer, path));
    }

    let mut outputs: Vec<SplitOutput> = Vec::with_capacity(planned.len());
    for (group, layer, path) in planned {
        if let Err(err) = write_layer(&image, layer, &path) {
            let _ = std::fs::remove_file(&path);
            discard_outputs(&outputs);
            return Err(err);
        }
        tracing::debug!(
            group = %group.name,
            channels = group.len(),
            out = %path.display(),
            "wrote AOV group"
        );
        outputs.push(SplitOutput {
            group: group.name.clone(),
            path,
            channels: group.channel_names.clone(),
            is_matte: group.is_matte,
        });
    }

    Ok(SplitOutcome {
        source: source.to_path_buf(),
        outputs,
    })
}

fn build_layer(image: &FlatImage, group: &AovGroup) -> ReelResult<FlatLayer> {
    let first = group
        .channels
        .first()
        .ok_or_else(|| ReelError::transform(format!("group '{}' has no channels", group.name)))?;
    let base = image
        .layer_data
        .get(first.part)
        .ok_or_else(|| ReelError::transform(format!("missing part {}", first.part)))?;

    let mut list: SmallVec<[AnyChannel<FlatSamples>; 4]> = SmallVec::new();
    for (channel, name) in group.channels.iter().zip(&group.channel_names) {
        let layer = image
            .layer_data
            .get(channel.part)
            .ok_or_else(|| ReelError::transform(format!("missing part {}", channel.part)))?;
        if layer.size != base.size {
            return Err(ReelError::transform(format!(
                "group '{}' mixes {}x{} and {}x{} channels",
                group.name, base.size.0, base.size.1, layer.size.0, layer.size.1
            )));
        }
        let src = layer.channel_data.list.get(channel.index).ok_or_else(|| {
            ReelError::transform(format!(
                "part {} has no channel {}",
                channel.part, channel.index
            ))
        })?;
        if list.iter().any(|c| c.name.to_string() == *name) {
            return Err(ReelError::transform(format!(
                "duplicate channel '{name}' in group '{}'",
                group.name
            )));
        }
        list.push(AnyChannel {
            name: Text::from(name.as_str()),
            sample_data: src.sample_data.clone(),
            quantize_linearly: src.quantize_linearly,
            sampling: src.sampling,
        });
    }

    let mut attributes = base.attributes.clone();
    attributes.layer_name = None;
    // The file format stores channels alphabetically.
    Ok(Layer::new(
        base.size,
        attributes,
        base.encoding,
        AnyChannels::sort(list),
    ))
}

fn write_layer(image: &FlatImage, layer: FlatLayer, path: &Path) -> ReelResult<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ReelError::io(dir, e))?;
    }
    let layers: Layers<AnyChannels<FlatSamples>> = smallvec::smallvec![layer];
    let out = Image::new(image.attributes.clone(), layers);
    out.write().to_file(path).map_err(|e| match e {
        exr::error::Error::Io(io) => ReelError::io(path, io),
        other => ReelError::io(path, std::io::Error::other(other.to_string())),
    })
}

/// Remove files from a split that failed part way, and their group directories once empty.
fn discard_outputs(outputs: &[SplitOutput]) {
    for output in outputs {
        if let Err(err) = std::fs::remove_file(&output.path) {
            tracing::warn!(path = %output.path.display(), error = %err, "could not remove output");
        }
        if let Some(dir) = output.path.parent() {
            let _ = std::fs::remove_dir(dir);
        }
    }
}

/// Split many files, continuing past per-file failures.
pub fn split_aovs_batch(sources: &[PathBuf], opts: &SplitOpts) -> BatchReport {
    run_batch("split AOVs", sources, |source| {
        split_aovs(source, opts).map(|outcome| {
            outcome
                .outputs
                .into_iter()
                .map(|o| o.path)
                .collect::<Vec<_>>()
        })
    })
}

#[cfg(test)]
#[path = "../../tests/unit/aov/split.rs"]
mod tests;
