use crate::menu::{ExtensionSpec, Key, MenuNode};

pub(super) fn menu() -> MenuNode {
    let people = MenuNode::new("directory/enter_extension")
        .extension(ExtensionSpec::fixed(3))
        .option("101", MenuNode::new("directory/alice"))
        .option("102", MenuNode::new("directory/bob"))
        .option("103", MenuNode::new("directory/charlie"))
        .back(Key::Star);

    let departments = MenuNode::new("directory/departments")
        .extension(ExtensionSpec::terminated(Key::Pound))
        .option("10", MenuNode::new("directory/sales"))
        .option("20", MenuNode::new("directory/support"))
        .option("30", MenuNode::new("directory/billing"))
        .back(Key::Star);

    MenuNode::new("directory/welcome")
        .option("1", people)
        .option("2", departments)
        .option("0", MenuNode::new("directory/operator"))
}
