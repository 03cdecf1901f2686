//! Plain `tree`-style rendering

use super::node::TreeNode;

/// Render the children of `root` with box-drawing connectors, one entry
/// per line. Directories get a trailing `/`; the root itself is omitted.
pub fn render_tree(root: &TreeNode) -> String {
    let mut out = String::new();
    render_children(root, "", &mut out);
    out
}

fn render_children(node: &TreeNode, prefix: &str, out: &mut String) {
    let children = node.children();
    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        let (connector, extension) = if is_last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };

        out.push_str(prefix);
        out.push_str(connector);
        out.push_str(child.name());
        if child.is_dir() {
            out.push('/');
        }
        out.push('\n');

        if child.is_dir() {
            render_children(child, &format!("{}{}", prefix, extension), out);
        }
    }
}
