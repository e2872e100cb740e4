//! Multiverse export.
//!
//! Walks an already-materialized tree depth-first and writes it as pretty
//! JSON. Export is a pure read: it never measures, so unmeasured leaves are
//! written with their current state and weight.

use crate::error::MultiverseError;
use crate::universe::{Universe, UniverseId};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// One outcome row of a universe's amplitude table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmplitudeEntry {
    pub outcome: String,
    pub re: f64,
    pub im: f64,
    pub probability: f64,
}

/// Serializable form of a universe and its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniverseNode {
    /// Universe ID
    pub id: UniverseId,

    /// Outcome that created this universe (null for the root)
    pub parent_outcome: Option<String>,

    /// Observable that created this universe (null for the root)
    pub observable: Option<String>,

    /// Born-rule weight
    pub weight: f64,

    /// Distance from the export root's tree root
    pub depth: usize,

    /// Sorted observables measured so far
    pub measured_observables: Vec<String>,

    /// Amplitude table in basis order
    pub amplitudes: Vec<AmplitudeEntry>,

    /// Event log inherited along the branch
    pub history: Vec<String>,

    /// Children grouped by measurement, outcome order within a group
    pub children: Vec<UniverseNode>,
}

impl UniverseNode {
    /// Pre-order `(id, outcome, weight, depth)` sequence for shape comparisons.
    pub fn shape(&self) -> Vec<(UniverseId, Option<String>, f64, usize)> {
        let mut out = Vec::new();
        self.collect_shape(&mut out);
        out
    }

    fn collect_shape(&self, out: &mut Vec<(UniverseId, Option<String>, f64, usize)>) {
        out.push((self.id, self.parent_outcome.clone(), self.weight, self.depth));
        for child in &self.children {
            child.collect_shape(out);
        }
    }

    /// Number of nodes in this subtree.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(UniverseNode::count).sum::<usize>()
    }
}

/// Builds the serializable tree without touching the universes.
pub fn snapshot(root: &Universe) -> UniverseNode {
    let origin = root.origin();

    UniverseNode {
        id: root.id(),
        parent_outcome: origin.map(|o| o.outcome.clone()),
        observable: origin.map(|o| o.observable.clone()),
        weight: root.weight(),
        depth: root.depth(),
        measured_observables: root.measured_observables().map(str::to_string).collect(),
        amplitudes: root
            .system()
            .amplitudes()
            .iter()
            .map(|(outcome, amp)| AmplitudeEntry {
                outcome: outcome.clone(),
                re: amp.re,
                im: amp.im,
                probability: amp.norm_sqr(),
            })
            .collect(),
        history: root.history().to_vec(),
        children: root.children().iter().map(snapshot).collect(),
    }
}

/// Writes the tree rooted at `root` to any writer.
pub fn write_multiverse<W: Write>(root: &Universe, writer: W) -> Result<(), MultiverseError> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, &snapshot(root))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Writes the tree rooted at `root` to a file.
///
/// # Errors
/// `Io` when the file cannot be created or written.
pub fn dump_multiverse<P: AsRef<Path>>(root: &Universe, path: P) -> Result<(), MultiverseError> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_multiverse(root, file)?;
    info!("Exported multiverse rooted at {} to {}", root.id(), path.display());
    Ok(())
}

/// Parses a file written by [`dump_multiverse`].
pub fn read_multiverse<P: AsRef<Path>>(path: P) -> Result<UniverseNode, MultiverseError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
