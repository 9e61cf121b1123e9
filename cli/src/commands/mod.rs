mod bodyfat;
mod entry;
mod export;
mod helpers;
mod measure;
mod photo;
mod trend;

pub(crate) use bodyfat::{cmd_bodyfat_clear, cmd_bodyfat_mode, cmd_bodyfat_set};
pub(crate) use entry::{cmd_delete, cmd_history, cmd_log, cmd_show};
pub(crate) use export::cmd_export;
pub(crate) use measure::{cmd_measure_clear, cmd_measure_set, cmd_measure_show, cmd_sex};
pub(crate) use photo::{cmd_photo_attach, cmd_photo_list, cmd_photo_remove, cmd_photo_show};
pub(crate) use trend::cmd_trend;
