use std::collections::{HashMap, HashSet};

use slotmap::SecondaryMap;
use tracing::{debug, info};

use crate::error::{AttributeError, OperationError, Result};
use crate::math::{nonzero, DisjointSet, VectorN};
use crate::mesh::{Mesh, MeshOutput, MeshTarget, INDEX, SELECTION};
use crate::topology::{MeshGraph, VertexId};

/// Summary of one labeling pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComponentReport {
    /// Number of components found.
    pub num_components: usize,
    /// Vertex count per label; `sizes[0]` belongs to label 1.
    pub sizes: Vec<usize>,
    /// Vertices removed by filtering.
    pub removed: usize,
}

/// Component labels of a vertex subset, ranked so label 1 is the largest
/// component. Vertices outside the subset have label 0.
struct Labeling {
    labels: SecondaryMap<VertexId, usize>,
    sizes: Vec<usize>,
}

impl Labeling {
    /// Labels vertices with a non-zero class, joining ring neighbours that
    /// share the class.
    ///
    /// Vertices are visited once in ascending handle order, looking only at
    /// neighbours visited before them. A vertex takes the label of the
    /// neighbour whose set is currently smallest (first in ring order on
    /// ties), and every distinct neighbour label is joined into it.
    fn compute(graph: &MeshGraph, classes: &SecondaryMap<VertexId, i64>) -> Result<Self> {
        let class = |v: VertexId| classes.get(v).copied().unwrap_or(0);

        let mut sets: DisjointSet<usize> = DisjointSet::new();
        let mut provisional: SecondaryMap<VertexId, usize> = SecondaryMap::new();
        let mut next = 1;

        for v in graph.vertices() {
            let cv = class(v);
            if cv == 0 {
                continue;
            }

            let mut adjacent: Vec<usize> = Vec::new();
            for &w in graph.vert_ring(v)? {
                if class(w) != cv {
                    continue;
                }
                if let Some(&label) = provisional.get(w) {
                    if !adjacent.contains(&label) {
                        adjacent.push(label);
                    }
                }
            }

            let Some((&first, rest)) = adjacent.split_first() else {
                sets.add(next);
                provisional.insert(v, next);
                next += 1;
                continue;
            };

            let mut chosen = first;
            let mut smallest = sets.get_size(&first)?;
            for &label in rest {
                let size = sets.get_size(&label)?;
                if size < smallest {
                    chosen = label;
                    smallest = size;
                }
            }
            provisional.insert(v, chosen);
            for &label in &adjacent {
                sets.join(&chosen, &label)?;
            }
        }

        // roots in first-visited order, so equal sizes rank by first vertex
        let mut roots: Vec<usize> = Vec::new();
        let mut counts: HashMap<usize, usize> = HashMap::new();
        let mut resolved: Vec<(VertexId, usize)> = Vec::with_capacity(provisional.len());
        for v in graph.vertices() {
            if let Some(&label) = provisional.get(v) {
                let root = sets.find(&label)?;
                let count = counts.entry(root).or_insert(0);
                if *count == 0 {
                    roots.push(root);
                }
                *count += 1;
                resolved.push((v, root));
            }
        }

        roots.sort_by(|x, y| counts[y].cmp(&counts[x]));
        let rank: HashMap<usize, usize> = roots
            .iter()
            .enumerate()
            .map(|(i, &root)| (root, i + 1))
            .collect();
        let sizes = roots.iter().map(|root| counts[root]).collect();

        let mut labels = SecondaryMap::new();
        for (v, root) in resolved {
            labels.insert(v, rank[&root]);
        }
        debug!(provisional = next - 1, components = roots.len(), "labeled components");
        Ok(Self { labels, sizes })
    }

    fn label(&self, v: VertexId) -> usize {
        self.labels.get(v).copied().unwrap_or(0)
    }

    fn report(&self) -> ComponentReport {
        ComponentReport {
            num_components: self.sizes.len(),
            sizes: self.sizes.clone(),
            removed: 0,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn round_class(value: f64) -> i64 {
    value.round() as i64
}

#[allow(clippy::cast_precision_loss)]
fn label_value(label: usize) -> VectorN {
    VectorN::from_element(1, label as f64)
}

/// Declares a 1-D output channel, or checks an existing one is 1-D.
fn declare_scalar(mesh: &mut Mesh, name: &str) -> Result<()> {
    if !mesh.attrs().has(name) {
        mesh.attrs_mut().add(name, VectorN::zeros(1))?;
        return Ok(());
    }
    let dim = mesh.attrs().dim(name)?;
    if dim != 1 {
        return Err(AttributeError::DimensionMismatch {
            name: name.to_owned(),
            expected: 1,
            found: dim,
        }
        .into());
    }
    Ok(())
}

fn split_names(list: &str) -> Vec<String> {
    list.split(',').map(|s| s.trim().to_owned()).collect()
}

/// Labels connected components of vertex selections.
///
/// Each input channel is read as a 1-D selection: a vertex is selected
/// when its rounded value is non-zero, and neighbours join only when
/// their rounded values agree, so label-valued selections split by value.
/// The output channel receives the component label (1 for the largest),
/// or with `largest` a mask that is 1 on the largest component only.
/// Unselected vertices get 0.
pub struct LabelComponents {
    inputs: Vec<String>,
    outputs: Option<Vec<String>>,
    largest: bool,
}

impl Default for LabelComponents {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelComponents {
    /// Creates a new `LabelComponents` operation reading and overwriting
    /// the "selection" channel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inputs: vec![SELECTION.to_owned()],
            outputs: None,
            largest: false,
        }
    }

    /// Sets the input channels as a comma-separated list.
    #[must_use]
    pub fn with_input(mut self, attrin: &str) -> Self {
        self.inputs = split_names(attrin);
        self
    }

    /// Sets the output channels as a comma-separated list matching the
    /// inputs. Defaults to the inputs themselves.
    #[must_use]
    pub fn with_output(mut self, attrout: &str) -> Self {
        self.outputs = Some(split_names(attrout));
        self
    }

    /// Emits a mask of the largest component instead of labels.
    #[must_use]
    pub fn with_largest(mut self, largest: bool) -> Self {
        self.largest = largest;
        self
    }

    fn channel_pairs(&self) -> Result<Vec<(&str, &str)>> {
        let outputs = self.outputs.as_ref().unwrap_or(&self.inputs);
        if outputs.len() != self.inputs.len() {
            return Err(OperationError::InvalidInput(format!(
                "{} input channels but {} output channels",
                self.inputs.len(),
                outputs.len()
            ))
            .into());
        }
        if self.inputs.iter().chain(outputs).any(String::is_empty) {
            return Err(OperationError::InvalidInput("empty channel name".into()).into());
        }
        Ok(self
            .inputs
            .iter()
            .zip(outputs)
            .map(|(i, o)| (i.as_str(), o.as_str()))
            .collect())
    }

    /// Executes the labeling on a copy or on the caller's mesh, returning
    /// one report per channel pair.
    ///
    /// In place, each output channel is overwritten; the topology is never
    /// touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel lists are malformed, an input
    /// channel is missing or zero-dimensional, or an output channel exists
    /// with a dimension other than 1.
    pub fn execute<'a>(
        &self,
        target: MeshTarget<'a>,
    ) -> Result<(MeshOutput<'a>, Vec<ComponentReport>)> {
        let mut output = target.into_output();
        let reports = self.run(&mut output)?;
        Ok((output, reports))
    }

    /// Labels `mesh` in place.
    ///
    /// # Errors
    ///
    /// See [`LabelComponents::execute`].
    pub fn run(&self, mesh: &mut Mesh) -> Result<Vec<ComponentReport>> {
        let pairs = self.channel_pairs()?;
        let mut reports = Vec::with_capacity(pairs.len());

        for (input, output) in pairs {
            let mut classes = SecondaryMap::new();
            for v in mesh.graph().vertices() {
                classes.insert(v, round_class(mesh.attrs().scalar(v, input)?));
            }
            let labeling = Labeling::compute(mesh.graph(), &classes)?;

            declare_scalar(mesh, output)?;
            let verts: Vec<VertexId> = mesh.graph().vertices().collect();
            for v in verts {
                let label = labeling.label(v);
                let value = if self.largest { usize::from(label == 1) } else { label };
                mesh.attrs_mut().set(v, output, &label_value(value))?;
            }

            let report = labeling.report();
            info!(
                input,
                output,
                components = report.num_components,
                largest = report.sizes.first().copied().unwrap_or(0),
                "labeled selection components"
            );
            reports.push(report);
        }
        Ok(reports)
    }
}

/// Labels the connected components of the whole mesh and optionally
/// filters them.
///
/// Without `largest` every surviving vertex receives its component label
/// in the output channel ("index" by default). Filters apply in order:
/// `area` keeps components whose surface area exceeds the threshold,
/// `largest` keeps only label 1, and `select` keeps components holding a
/// vertex with a non-zero value in the given channel (or, with `invert`,
/// the components holding none). Labels always refer to the unfiltered
/// ranking.
pub struct MeshComponents {
    attr: String,
    largest: bool,
    area: Option<f64>,
    select: Option<String>,
    invert: bool,
}

impl Default for MeshComponents {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshComponents {
    /// Creates a new `MeshComponents` operation writing to "index".
    #[must_use]
    pub fn new() -> Self {
        Self {
            attr: INDEX.to_owned(),
            largest: false,
            area: None,
            select: None,
            invert: false,
        }
    }

    /// Sets the output channel.
    #[must_use]
    pub fn with_attr(mut self, attr: &str) -> Self {
        attr.clone_into(&mut self.attr);
        self
    }

    /// Keeps only the largest component and writes no labels.
    #[must_use]
    pub fn with_largest(mut self, largest: bool) -> Self {
        self.largest = largest;
        self
    }

    /// Keeps components whose surface area exceeds `area`.
    #[must_use]
    pub fn with_area(mut self, area: f64) -> Self {
        self.area = Some(area);
        self
    }

    /// Keeps components selected by a channel.
    #[must_use]
    pub fn with_select(mut self, select: &str) -> Self {
        self.select = Some(select.to_owned());
        self
    }

    /// Keeps the components the selection does not reach instead.
    #[must_use]
    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Executes the labeling on a copy or on the caller's mesh.
    ///
    /// In place, filtered vertices are removed from the caller's mesh and
    /// their handles become invalid.
    ///
    /// # Errors
    ///
    /// Returns an error if the area threshold is not finite, the output or
    /// selection channel is unusable, or a vertex has no position while
    /// filtering by area.
    pub fn execute<'a>(&self, target: MeshTarget<'a>) -> Result<(MeshOutput<'a>, ComponentReport)> {
        let mut output = target.into_output();
        let report = self.run(&mut output)?;
        Ok((output, report))
    }

    /// Labels and filters `mesh` in place.
    ///
    /// # Errors
    ///
    /// See [`MeshComponents::execute`].
    pub fn run(&self, mesh: &mut Mesh) -> Result<ComponentReport> {
        if self.attr.is_empty() {
            return Err(OperationError::InvalidInput("empty channel name".into()).into());
        }
        if let Some(area) = self.area {
            if !area.is_finite() {
                return Err(OperationError::InvalidInput(format!("area threshold {area}")).into());
            }
        }

        let mut classes = SecondaryMap::new();
        for v in mesh.graph().vertices() {
            classes.insert(v, 1);
        }
        let labeling = Labeling::compute(mesh.graph(), &classes)?;
        let mut report = labeling.report();

        if let Some(threshold) = self.area {
            let mut areas: HashMap<usize, f64> = HashMap::new();
            for face in mesh.graph().faces() {
                *areas.entry(labeling.label(face.a())).or_insert(0.0) += mesh.face_area(&face)?;
            }
            report.removed += mesh.retain_vertices(|v| {
                areas.get(&labeling.label(v)).is_some_and(|&a| a > threshold)
            })?;
        }

        if self.largest {
            report.removed += mesh.retain_vertices(|v| labeling.label(v) == 1)?;
        }

        if let Some(select) = &self.select {
            let mut selected: HashSet<usize> = HashSet::new();
            for v in mesh.graph().vertices() {
                if nonzero(mesh.attrs().scalar(v, select)?) {
                    selected.insert(labeling.label(v));
                }
            }
            let invert = self.invert;
            report.removed +=
                mesh.retain_vertices(|v| selected.contains(&labeling.label(v)) ^ invert)?;
        }

        if !self.largest {
            declare_scalar(mesh, &self.attr)?;
            let verts: Vec<VertexId> = mesh.graph().vertices().collect();
            for v in verts {
                mesh.attrs_mut().set(v, &self.attr, &label_value(labeling.label(v)))?;
            }
        }

        info!(
            components = report.num_components,
            removed = report.removed,
            remaining = mesh.graph().num_vertices(),
            "labeled mesh components"
        );
        Ok(report)
    }
}
