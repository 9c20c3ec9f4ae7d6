use serde::Serialize;

/// Usage figures for the direct children of a single folder.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_files: usize,
    pub total_folders: usize,
    pub total_size: u64,
}
