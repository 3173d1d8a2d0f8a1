use super::back_to_main;
use crate::menu::{Key, MenuNode};

/// Main menu: 1 information (1 weather, 2 time), 2 jokes, 3 music.
pub(super) fn menu() -> MenuNode {
    let info_menu = MenuNode::new("menu/info_menu")
        .option("1", MenuNode::new("menu/weather_info").action(back_to_main))
        .option("2", MenuNode::new("menu/time_info").action(back_to_main))
        .back(Key::Star);

    MenuNode::new("menu/main_menu")
        .option("1", info_menu)
        .option("2", MenuNode::new("menu/jokes").action(back_to_main))
        .option("3", MenuNode::new("menu/music").action(back_to_main))
}
