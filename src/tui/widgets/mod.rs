pub mod color;
pub mod editor;
pub mod form;
pub mod help;
pub mod item_view;
pub mod status_bar;
pub mod tabs;
pub mod task_list;
pub mod week_view;
