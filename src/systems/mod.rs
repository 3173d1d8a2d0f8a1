//! Phone systems compiled into the binary.

mod directory;
mod information_booth;

use crate::menu::ActionOutcome;
use crate::registry::SystemDescriptor;

/// Descriptors offered by the `builtin` scan path, in menu order.
pub fn catalog() -> &'static [SystemDescriptor] {
    &CATALOG
}

static CATALOG: [SystemDescriptor; 2] = [
    SystemDescriptor {
        id: "information_booth",
        display_name: "Information Booth",
        description: "Weather, time, jokes, and music",
        version: "1.0.0",
        build: information_booth::menu,
    },
    SystemDescriptor {
        id: "directory",
        display_name: "Company Directory",
        description: "Dial a three-digit extension or a department code",
        version: "1.0.0",
        build: directory::menu,
    },
];

/// Leaf action for systems that go back to their main menu after a message.
fn back_to_main() -> ActionOutcome {
    ActionOutcome::ReturnToRoot
}
