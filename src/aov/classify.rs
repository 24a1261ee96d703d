//! Channel-name rules that decide which output group a channel belongs to.
//!
//! Single-part files are classified per channel, multi-part files per part. The rules run in a
//! fixed order and the first match wins:
//!
//! 1. the matte marker appears in the name (case-insensitive) -> combined matte output
//! 2. the name is one of `R`, `G`, `B`, `A` -> `beauty`
//! 3. the name has a delimiter prefix (`diffuse.R`) -> group named after the prefix
//! 4. otherwise the channel stands alone (single-part) or the part becomes `part<N>`
//!
//! A multi-part layer-name attribute, when present, names the group ahead of rules 2-4.

pub const MATTE_GROUP: &str = "Crypto";
pub const BEAUTY_GROUP: &str = "beauty";

const BEAUTY_CHANNELS: [&str; 4] = ["R", "G", "B", "A"];
const DELIMITER: char = '.';

/// Channel names of one EXR part.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartChannels {
    pub layer_name: Option<String>,
    pub channels: Vec<String>,
}

/// Position of a channel in the source file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelRef {
    pub part: usize,
    pub index: usize,
}

/// One output file worth of channels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AovGroup {
    pub name: String,
    /// Source channels in source order.
    pub channels: Vec<ChannelRef>,
    /// Names written to the output, parallel to `channels`.
    pub channel_names: Vec<String>,
    pub is_matte: bool,
}

impl AovGroup {
    fn empty(name: impl Into<String>, is_matte: bool) -> Self {
        Self {
            name: name.into(),
            channels: Vec::new(),
            channel_names: Vec::new(),
            is_matte,
        }
    }

    /// Add a channel under `name`. A name already taken in this group falls back to the
    /// channel's full source name, then to `<name>_<index>`.
    fn push(&mut self, channel: ChannelRef, name: String, source_name: &str) {
        let name = if !self.has_name(&name) {
            name
        } else if !self.has_name(source_name) {
            source_name.to_string()
        } else {
            format!("{name}_{}", channel.index)
        };
        self.channels.push(channel);
        self.channel_names.push(name);
    }

    fn has_name(&self, name: &str) -> bool {
        self.channel_names.iter().any(|n| n == name)
    }

    /// Source channel indices, in order.
    pub fn channel_indices(&self) -> Vec<usize> {
        self.channels.iter().map(|c| c.index).collect()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// Which rule claimed a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    Matte,
    Beauty,
    Prefix,
    Fallback,
}

pub fn is_matte(name: &str, matte_token: &str) -> bool {
    name.to_ascii_lowercase()
        .contains(&matte_token.to_ascii_lowercase())
}

fn split_prefix(name: &str) -> Option<(&str, &str)> {
    name.split_once(DELIMITER)
        .filter(|(prefix, rest)| !prefix.is_empty() && !rest.is_empty())
}

/// Classify one channel of a single-part file: `(rule, group, local channel name)`.
pub fn channel_rule(name: &str, matte_token: &str) -> (Rule, String, String) {
    if is_matte(name, matte_token) {
        return (Rule::Matte, MATTE_GROUP.to_string(), name.to_string());
    }
    if BEAUTY_CHANNELS.contains(&name) {
        return (Rule::Beauty, BEAUTY_GROUP.to_string(), name.to_string());
    }
    if let Some((prefix, rest)) = split_prefix(name) {
        return (Rule::Prefix, prefix.to_string(), rest.to_string());
    }
    (Rule::Fallback, name.to_string(), name.to_string())
}

fn layer_name(part: &PartChannels) -> Option<&str> {
    part.layer_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
}

/// Classify one part of a multi-part file: `(rule, group name)`.
pub fn part_rule(part: &PartChannels, part_index: usize, matte_token: &str) -> (Rule, String) {
    let layer = layer_name(part);
    let matte = layer.is_some_and(|n| is_matte(n, matte_token))
        || part.channels.iter().any(|c| is_matte(c, matte_token));
    if matte {
        let name = layer.unwrap_or(MATTE_GROUP);
        return (Rule::Matte, name.to_string());
    }
    if let Some(name) = layer {
        return (Rule::Prefix, name.to_string());
    }
    if is_beauty_set(&part.channels) {
        return (Rule::Beauty, BEAUTY_GROUP.to_string());
    }
    if let Some(shared) = shared_prefix(&part.channels) {
        return (Rule::Prefix, shared.to_string());
    }
    (Rule::Fallback, format!("part{part_index}"))
}

/// Exactly `R`, `G`, `B` and `A`, in any order.
fn is_beauty_set(channels: &[String]) -> bool {
    channels.len() == BEAUTY_CHANNELS.len()
        && BEAUTY_CHANNELS
            .iter()
            .all(|b| channels.iter().any(|c| c == b))
}

fn shared_prefix(channels: &[String]) -> Option<&str> {
    let first = split_prefix(channels.first()?)?.0;
    channels
        .iter()
        .all(|c| split_prefix(c).is_some_and(|(p, _)| p == first))
        .then_some(first)
}

fn local_name<'a>(channel: &'a str, group: &str) -> &'a str {
    channel
        .strip_prefix(group)
        .and_then(|rest| rest.strip_prefix(DELIMITER))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(channel)
}

fn qualified_matte_name(channel: &str, layer: Option<&str>) -> String {
    match layer {
        Some(layer) if local_name(channel, layer) == channel => format!("{layer}.{channel}"),
        _ => channel.to_string(),
    }
}

fn unique_name(groups: &[AovGroup], name: String, part_index: usize) -> String {
    if groups.iter().any(|g| g.name == name) {
        format!("{name}_{part_index}")
    } else {
        name
    }
}

/// Group every channel of a file.
///
/// Non-matte groups come first, in discovery order; all matte channels follow as one group
/// named [`MATTE_GROUP`] that keeps their original (part-qualified) names.
pub fn classify_parts(parts: &[PartChannels], matte_token: &str) -> Vec<AovGroup> {
    let mut groups: Vec<AovGroup> = Vec::new();
    let mut matte = AovGroup::empty(MATTE_GROUP, true);

    if let [part] = parts {
        for (index, name) in part.channels.iter().enumerate() {
            let channel = ChannelRef { part: 0, index };
            let (rule, group, local) = channel_rule(name, matte_token);
            if rule == Rule::Matte {
                matte.push(channel, local, name);
                continue;
            }
            match groups.iter_mut().find(|g| g.name == group) {
                Some(existing) => existing.push(channel, local, name),
                None => {
                    let mut g = AovGroup::empty(group, false);
                    g.push(channel, local, name);
                    groups.push(g);
                }
            }
        }
    } else {
        for (part_index, part) in parts.iter().enumerate() {
            let (rule, group) = part_rule(part, part_index, matte_token);
            if rule == Rule::Matte {
                for (index, name) in part.channels.iter().enumerate() {
                    let qualified = qualified_matte_name(name, layer_name(part));
                    matte.push(
                        ChannelRef {
                            part: part_index,
                            index,
                        },
                        qualified.clone(),
                        &qualified,
                    );
                }
                continue;
            }
            let mut g = AovGroup::empty(unique_name(&groups, group.clone(), part_index), false);
            for (index, name) in part.channels.iter().enumerate() {
                let local = local_name(name, &group).to_string();
                g.push(
                    ChannelRef {
                        part: part_index,
                        index,
                    },
                    local,
                    name,
                );
            }
            groups.push(g);
        }
    }

    if !matte.is_empty() {
        groups.push(matte);
    }
    groups
}

/// Group name made safe for use as a single directory component.
pub fn directory_name(group: &str) -> String {
    let cleaned: String = group
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    match cleaned.trim() {
        "" | "." | ".." => "unnamed".to_string(),
        name => name.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/aov/classify.rs"]
mod tests;
