mod extensions;
mod platform;
mod ui_task;

pub(crate) use ui_task::ui_task_runner;
