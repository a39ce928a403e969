use std::io::{self, Read, Write};

use log::{debug, trace};

use crate::bitvec::BitView;
use crate::tree::{HuffmanTree, Node};
use crate::DecompressionError;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WalkSummary {

    /// Symbols written to the output
    pub emitted: u64,
    /// Leaves reached after their count was used up, i.e. pad bits
    pub suppressed: u64

}


/// Replays a packed payload through the tree, consuming leaf counts as it goes.
///
/// A leaf reached with a count of zero emits nothing: every real occurrence
/// was counted when the tree was built, so such a leaf can only come from the
/// zero padding of the final byte. A code left unfinished at the end of the
/// input is padding too and is dropped.
pub fn walk(tree: &mut HuffmanTree, input: impl Read, mut output: impl Write, buffer_size: usize) -> Result<WalkSummary, DecompressionError> {

    let mut summary = WalkSummary::default();
    let mut buffer = vec![0; buffer_size.max(1)];
    let mut decoded = Vec::with_capacity(buffer.len());
    let mut mid_code = false;

    let mut input = input;
    let mut cursor: &mut Node = tree.root_mut();

    loop {

        let n = match input.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        for bit in BitView::from_bytes(&buffer[..n]).iter_bits() {

            let next = match cursor {
                Node::Inner { left, right, .. } => if bit { right.as_mut() } else { left.as_mut() },
                Node::Leaf { .. } => unreachable!("the cursor only rests on inner nodes"),
            };

            if let Node::Leaf { symbol, count } = next {

                if *count > 0 {
                    decoded.push(*symbol);
                    *count -= 1;
                    summary.emitted += 1;
                } else {
                    summary.suppressed += 1;
                }

                cursor = tree.root_mut();
                mid_code = false;

            } else {
                cursor = next;
                mid_code = true;
            }
        }

        if decoded.len() >= buffer.len() {
            output.write_all(&decoded)?;
            decoded.clear();
        }
    }

    output.write_all(&decoded)?;
    output.flush()?;

    if mid_code {
        trace!("payload ended inside a code");
    }

    debug!("decoded {} bytes, dropped {} padding symbols", summary.emitted, summary.suppressed);

    Ok(summary)
}
