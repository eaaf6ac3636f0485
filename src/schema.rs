pub const FILE_STATS_JSON: &str = "stats.json";

pub const SPLIT_TRAIN: &str = "train";
pub const SPLIT_VAL: &str = "val";

/// Raw project split → subdirectory name expected under `data/raw/<fmt>/<dataset>`.
pub const RAW_SPLIT_DIRS: [(&str, &str); 3] = [
    ("train", "training"),
    ("val", "validation"),
    ("test", "test"),
];

pub const SUMMARY_HEADER: [&str; 5] = [
    "project",
    "status",
    "from_scratch_run",
    "fine_tuned_run",
    "error",
];
