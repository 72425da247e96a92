//! Build a leaf set and watch peers take their positions.

use pastry::{LeafSet, Node, Result, Side};
use tracing::Level;

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

    let local = Node::random();
    println!("Local node {}", local.id());

    let leafset = LeafSet::new(local);

    for i in 1..=8 {
        let peer = Node::unique(i);
        let entry = leafset.insert(peer)?;

        println!(
            "Peer {} -> position {} on the {:?} side",
            entry.node.id(),
            entry.position,
            entry.side
        );
    }

    let info = leafset.info()?;
    println!(
        "Leaf set holds {} peers left, {} right",
        info.left_len(),
        info.right_len()
    );

    for side in [Side::Left, Side::Right] {
        let mut position = 0;
        while let Some(entry) = leafset.get_by_position(position, side)? {
            println!("{:?} {}: {}", side, position, entry.node.id());
            position += 1;
        }
    }

    Ok(())
}
