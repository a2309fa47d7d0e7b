// error.rs
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RigError {
    #[error("Asset '{0}' not embedded")]
    MissingAsset(String),

    #[error("Parse error in {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Bone '{0}' is defined twice")]
    DuplicateBone(String),

    #[error("Bone '{bone}' names unknown parent '{parent}'")]
    UnknownParent { bone: String, parent: String },

    #[error("Rig has no root bone")]
    NoRoot,

    #[error("Rig has more than one root bone ('{first}' and '{second}')")]
    MultipleRoots { first: String, second: String },

    #[error("Overlay bound to unknown bone '{0}'")]
    UnknownBone(String),

    #[error("Failed to decode {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
