//! Fusion-breakpoint events and the collections the overlap engine merges.

use crate::error::Result;
use crate::interval::Strand;
use crate::output::TsvWriter;
use rustc_hash::FxHashSet;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Identifiers of events reconciled into a larger combination.
pub type MatchedSet = FxHashSet<EventId>;

/// One side of a fusion junction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Breakpoint {
    pub chrom: String,
    pub pos: u64,
    pub strand: Strand,
}

impl Breakpoint {
    pub fn new(chrom: impl Into<String>, pos: u64, strand: Strand) -> Self {
        Self {
            chrom: chrom.into(),
            pos,
            strand,
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chrom, self.pos)
    }
}

/// A raw prediction an event stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// 1-based registry index of the dataset the prediction came from.
    pub dataset: usize,
    /// 0-based row of the prediction within its dataset.
    pub ordinal: usize,
    pub left: Breakpoint,
    pub right: Breakpoint,
}

/// Identity of an event: the sorted `(dataset, ordinal)` pairs of its origins.
///
/// Derived from content only, so re-running the same inputs yields the same ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(Vec<(usize, usize)>);

impl EventId {
    pub fn members(&self) -> &[(usize, usize)] {
        &self.0
    }
}

/// A fusion between two genomic breakpoints and the genes annotated at each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FusionEvent {
    pub left: Breakpoint,
    pub right: Breakpoint,
    pub left_genes: Vec<String>,
    pub right_genes: Vec<String>,
    origins: Vec<Origin>,
}

impl FusionEvent {
    /// Create an event read from a dataset; it is its own single origin.
    pub fn new(
        dataset: usize,
        ordinal: usize,
        left: Breakpoint,
        right: Breakpoint,
        left_genes: Vec<String>,
        right_genes: Vec<String>,
    ) -> Self {
        let origin = Origin {
            dataset,
            ordinal,
            left: left.clone(),
            right: right.clone(),
        };
        Self {
            left,
            right,
            left_genes,
            right_genes,
            origins: vec![origin],
        }
    }

    /// Build the event that results from reconciling `self` with `other`.
    ///
    /// Breakpoints come from `self`; the gene lists are supplied by the matcher.
    pub fn merged_with(
        &self,
        other: &FusionEvent,
        left_genes: Vec<String>,
        right_genes: Vec<String>,
    ) -> Self {
        let mut origins = self.origins.clone();
        for origin in &other.origins {
            if !origins
                .iter()
                .any(|o| o.dataset == origin.dataset && o.ordinal == origin.ordinal)
            {
                origins.push(origin.clone());
            }
        }
        origins.sort_by(|a, b| a.dataset.cmp(&b.dataset).then(a.ordinal.cmp(&b.ordinal)));

        Self {
            left: self.left.clone(),
            right: self.right.clone(),
            left_genes,
            right_genes,
            origins,
        }
    }

    pub fn id(&self) -> EventId {
        EventId(self.origins.iter().map(|o| (o.dataset, o.ordinal)).collect())
    }

    pub fn origins(&self) -> &[Origin] {
        &self.origins
    }

    /// Origins contributed by one dataset (1-based index).
    pub fn origins_from(&self, dataset: usize) -> impl Iterator<Item = &Origin> {
        self.origins.iter().filter(move |o| o.dataset == dataset)
    }

    pub fn has_genes(&self) -> bool {
        !self.left_genes.is_empty() && !self.right_genes.is_empty()
    }

    /// Write `chrL:posL-chrR:posR`.
    pub fn write_position<W: Write>(&self, out: &mut TsvWriter<W>) -> Result<()> {
        write_junction(out, &self.left, &self.right)
    }
}

fn write_junction<W: Write>(
    out: &mut TsvWriter<W>,
    left: &Breakpoint,
    right: &Breakpoint,
) -> Result<()> {
    out.write_locus(&left.chrom, left.pos)?;
    out.write_str("-")?;
    out.write_locus(&right.chrom, right.pos)
}

/// A named, ordered collection of fusion events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FusionCollection {
    pub name: String,
    events: Vec<FusionEvent>,
}

impl FusionCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: Vec::new(),
        }
    }

    pub fn from_events(name: impl Into<String>, events: Vec<FusionEvent>) -> Self {
        Self {
            name: name.into(),
            events,
        }
    }

    pub fn push(&mut self, event: FusionEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FusionEvent> {
        self.events.iter()
    }

    pub fn events(&self) -> &[FusionEvent] {
        &self.events
    }

    /// Write one list row per event not in `matched`.
    ///
    /// Row layout: left genes, right genes, then one column per dataset in
    /// `dataset_names` order holding the positions of the origins that
    /// dataset contributed (empty if none). Returns the number of rows written.
    pub fn export_list<W: Write>(
        &self,
        out: &mut TsvWriter<W>,
        dataset_names: &[String],
        matched: &MatchedSet,
    ) -> Result<usize> {
        let mut written = 0;

        for event in &self.events {
            if !matched.is_empty() && matched.contains(&event.id()) {
                continue;
            }

            out.write_joined(&event.left_genes, ";")?;
            out.write_tab()?;
            out.write_joined(&event.right_genes, ";")?;

            for dataset in 1..=dataset_names.len() {
                out.write_tab()?;
                for (i, origin) in event.origins_from(dataset).enumerate() {
                    if i > 0 {
                        out.write_str(",")?;
                    }
                    write_junction(out, &origin.left, &origin.right)?;
                }
            }
            out.write_newline()?;
            written += 1;
        }

        Ok(written)
    }

    /// Write the collection as a junction table to `path`.
    pub fn export_junctions<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut out = TsvWriter::new(file);

        out.write_row(&[
            "Id",
            "LeftChr",
            "LeftPosition",
            "LeftStrand",
            "RightChr",
            "RightPosition",
            "RightStrand",
            "LeftGenes",
            "RightGenes",
        ])?;

        for (i, event) in self.events.iter().enumerate() {
            out.write_int(i + 1)?;
            for bp in [&event.left, &event.right] {
                out.write_tab()?;
                out.write_str(&bp.chrom)?;
                out.write_tab()?;
                out.write_int(bp.pos)?;
                out.write_tab()?;
                out.write_str(&bp.strand.to_string())?;
            }
            out.write_tab()?;
            out.write_joined(&event.left_genes, ";")?;
            out.write_tab()?;
            out.write_joined(&event.right_genes, ";")?;
            out.write_newline()?;
        }

        out.flush()
    }
}

impl<'a> IntoIterator for &'a FusionCollection {
    type Item = &'a FusionEvent;
    type IntoIter = std::slice::Iter<'a, FusionEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
