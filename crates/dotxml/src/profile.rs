//! Device profiles
//!
//! A device profile is an XML file named `profile.<device_type>.xml` that
//! describes how to pick measurements out of the messages a device sends:
//!
//! ```xml
//! <profile>
//!   <message>
//!     <type>default</type>
//!     <tag_pattern>//{server}/IOT.{device}.{point}.result</tag_pattern>
//!     <point><name>data.INPUT_001</name><alias>input_1</alias></point>
//!     <point><name>data.VOLTS</name></point>
//!   </message>
//! </profile>
//! ```
//!
//! Point names are paths resolved against the incoming message tree.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::value::{Node, Value};
use crate::xml::Config;

const PROFILE_KEY: &str = "profile";

/// Loads device profiles from a folder and caches them by device type.
///
/// Device types without a profile file are remembered and not looked up on
/// disk again.
#[derive(Debug)]
pub struct ProfileStore {
    folder: PathBuf,
    config: Config,
    profiles: RwLock<HashMap<String, Arc<Node>>>,
    unsupported: RwLock<HashSet<String>>,
}

impl ProfileStore {
    /// An empty `folder` disables loading: every device type is unsupported.
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self::with_config(folder, Config::default())
    }

    pub fn with_config(folder: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            folder: folder.into(),
            config,
            profiles: RwLock::new(HashMap::new()),
            unsupported: RwLock::new(HashSet::new()),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// File the profile for `device_type` is read from
    pub fn profile_path(&self, device_type: &str) -> PathBuf {
        self.folder.join(format!("profile.{device_type}.xml"))
    }

    /// The `profile` node for `device_type`, loading it on first use.
    ///
    /// Returns `Ok(None)` when there is no profile file, or when the file's
    /// root element is not `<profile>` with child elements. Parse and read
    /// errors are returned and nothing is cached, so a fixed file is picked
    /// up on the next call.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, device_type: &str) -> Result<Option<Arc<Node>>> {
        if let Some(profile) = self.profiles.read().get(device_type) {
            return Ok(Some(Arc::clone(profile)));
        }
        if self.is_unsupported(device_type) || self.folder.as_os_str().is_empty() {
            return Ok(None);
        }

        let path = self.profile_path(device_type);
        if !path.is_file() {
            warn!(device_type, path = %path.display(), "no profile for device type");
            self.mark_unsupported(device_type);
            return Ok(None);
        }

        let mut root = crate::from_file_with_config(&path, self.config)?;
        let Some(Value::Node(profile)) = root.take(PROFILE_KEY) else {
            warn!(device_type, path = %path.display(), "file has no <profile> element");
            self.mark_unsupported(device_type);
            return Ok(None);
        };

        debug!(device_type, "profile loaded");
        let profile = Arc::clone(
            self.profiles
                .write()
                .entry(device_type.to_string())
                .or_insert_with(|| Arc::new(profile)),
        );
        Ok(Some(profile))
    }

    pub fn is_unsupported(&self, device_type: &str) -> bool {
        self.unsupported.read().contains(device_type)
    }

    /// Number of profiles currently cached
    pub fn cached(&self) -> usize {
        self.profiles.read().len()
    }

    fn mark_unsupported(&self, device_type: &str) {
        self.unsupported.write().insert(device_type.to_string());
    }
}

/// The message profile whose `type` is `msg_type`.
///
/// A profile holds either one `message` or a list of them; the first match
/// wins.
pub fn message_profile<'a>(profile: &'a Node, msg_type: &str) -> Option<&'a Node> {
    let is_match = |message: &&Node| {
        message
            .get("type")
            .is_some_and(|t| t.is_scalar() && t.to_string() == msg_type)
    };
    match profile.get("message")? {
        Value::Node(message) => Some(message).filter(is_match),
        Value::List(messages) => messages.iter().filter_map(Value::as_node).find(is_match),
        _ => None,
    }
}

/// The `point` entries of a message profile, keyed by their `name`.
///
/// Points without a scalar `name` are skipped; a repeated name keeps the
/// last point.
pub fn points(message: &Node) -> IndexMap<String, &Node> {
    let candidates: Vec<&Value> = match message.get("point") {
        Some(Value::List(list)) => list.iter().collect(),
        Some(point) => vec![point],
        None => Vec::new(),
    };

    let mut result = IndexMap::new();
    for point in candidates.into_iter().filter_map(Value::as_node) {
        match point.get("name") {
            Some(name) if name.is_scalar() && !name.is_null() => {
                result.insert(name.to_string(), point);
            }
            _ => debug!("point without a name skipped"),
        }
    }
    result
}

/// Fill in the `{server}`, `{device}` and `{point}` placeholders of a tag
/// pattern
pub fn expand_tag(pattern: &str, server: &str, device: &str, point: &str) -> String {
    pattern
        .replace("{server}", server)
        .replace("{device}", device)
        .replace("{point}", point)
}

/// One measurement picked out of a message
#[derive(Clone, Debug, PartialEq)]
pub struct Reading {
    /// Point name (its path in the message)
    pub point: String,
    /// Expanded tag name
    pub tag: String,
    /// Value found in the message (never null)
    pub value: Value,
}

/// Pick the measurements described by `profile` out of `message`.
///
/// Each point's `name` is resolved against the message; points that are
/// missing or null in the message produce no reading. Tags come from the
/// profile's `tag_pattern`, using the point's `alias` when it has one and
/// the message's `device` field.
pub fn readings(message: &Node, profile: &Node, server: &str) -> Vec<Reading> {
    let pattern = profile
        .resolve("tag_pattern")
        .filter(|p| p.is_scalar() && !p.is_null())
        .map(Value::to_string)
        .unwrap_or_default();
    let device = match message.resolve("device") {
        Some(device) if !device.is_null() => device.to_string(),
        _ => String::new(),
    };

    let mut result = Vec::new();
    for (name, point) in points(profile) {
        let Some(value) = message.resolve(&name).filter(|v| !v.is_null()) else {
            continue;
        };
        let alias = match point.get("alias") {
            Some(alias) if alias.is_scalar() && !alias.is_null() => alias.to_string(),
            _ => name.clone(),
        };
        let tag = expand_tag(&pattern, server, &device, &alias);
        debug!(%tag, %value, "reading");
        result.push(Reading {
            point: name,
            tag,
            value: value.clone(),
        });
    }
    result
}
