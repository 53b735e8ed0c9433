use crate::{Metadata, Plugins};
use serde::{Deserialize, Serialize};

/// A named, reusable bundle of plugin blocks that routes reference by id
/// instead of repeating the blocks inline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    #[serde(flatten)]
    pub metadata: Metadata,

    #[serde(default)]
    pub plugins: Plugins,
}
