mod ui;

pub use ui::{print_collect_stats, print_pair_stats};
