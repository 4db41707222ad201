//! Trees of folders, observations, beams and pipelines, and their MoM XML.
//!
//! Nodes live in a [`SpecificationTree`] arena and refer to each other by
//! [`NodeId`]. A node's place in the tree is given by its topology label,
//! e.g. `EoR.0.3C196_HBA_DUAL_INNER.1.4C45.16`, which MoM uses to link data
//! products to the pipelines that consume them.

mod backend;
mod beam;
mod error;
mod folder;
mod observation;
mod pipeline;

pub use backend::{BackendProcessing, Polarizations, Stokes, StokesMode, TiedArrayBeams};
pub use beam::{parse_subband_list, Beam, MeasurementType, SubbandSpec};
pub use error::SpecificationError;
pub use folder::Folder;
pub use observation::{AntennaSet, BitMode, Clock, FrequencyRange, Observation};
pub use pipeline::{AveragingPipeline, DemixSource, Ndppp};

use std::{collections::BTreeSet, fmt::Display, str::FromStr};

use itertools::Itertools;
use log::{debug, trace};
use strum::IntoEnumIterator;

use crate::formats::indent;
use pipeline::PipelineContext;

/// Parse `value` as one of the variants of `T`, listing all of them if it
/// isn't one.
pub fn parse_enum<T>(field: &'static str, value: &str) -> Result<T, SpecificationError>
where
    T: FromStr + IntoEnumIterator + Display,
{
    T::from_str(value).map_err(|_| SpecificationError::InvalidValue {
        field,
        value: value.to_string(),
        allowed: T::iter().join(", "),
    })
}

/// A handle on a node of a [`SpecificationTree`]. Handles are only meaningful
/// for the tree that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Folder(Folder),
    Observation(Observation),
    Beam(Beam),
    Pipeline(AveragingPipeline),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Folder(f) => &f.name,
            Node::Observation(o) => o.name(),
            Node::Beam(b) => b.name(),
            Node::Pipeline(p) => p.name(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Node::Folder(_) => "folder",
            Node::Observation(_) => "observation",
            Node::Beam(_) => "beam",
            Node::Pipeline(_) => "pipeline",
        }
    }

    fn accepts(&self, child: &Node) -> bool {
        matches!(
            (self, child),
            (
                Node::Folder(_),
                Node::Folder(_) | Node::Observation(_) | Node::Pipeline(_)
            ) | (Node::Observation(_), Node::Beam(_) | Node::Pipeline(_))
        )
    }
}

impl From<Folder> for Node {
    fn from(f: Folder) -> Node {
        Node::Folder(f)
    }
}

impl From<Observation> for Node {
    fn from(o: Observation) -> Node {
        Node::Observation(o)
    }
}

impl From<Beam> for Node {
    fn from(b: Beam) -> Node {
        Node::Beam(b)
    }
}

impl From<AveragingPipeline> for Node {
    fn from(p: AveragingPipeline) -> Node {
        Node::Pipeline(p)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    node: Node,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The arena holding every node. Children are kept in document order; a
/// node's parent never changes once set.
#[derive(Debug, Clone, Default)]
pub struct SpecificationTree {
    entries: Vec<Entry>,
}

impl SpecificationTree {
    pub fn new() -> SpecificationTree {
        SpecificationTree::default()
    }

    /// Add an unattached node. An observation's beams are added too, as its
    /// children.
    pub fn add<N: Into<Node>>(&mut self, node: N) -> NodeId {
        let mut node = node.into();
        let beams = match &mut node {
            Node::Observation(o) => std::mem::take(&mut o.beams),
            _ => vec![],
        };
        let id = self.push(node);
        for beam in beams {
            let beam_id = self.push(Node::Beam(beam));
            self.link(id, beam_id);
        }
        id
    }

    /// Add a pipeline after checking that its inputs resolve to exactly one
    /// observation.
    pub fn add_pipeline(
        &mut self,
        pipeline: AveragingPipeline,
    ) -> Result<NodeId, SpecificationError> {
        self.pipeline_inputs(&pipeline)?;
        Ok(self.add(pipeline))
    }

    /// Add a node as the last child of `parent`.
    pub fn add_child<N: Into<Node>>(
        &mut self,
        parent: NodeId,
        node: N,
    ) -> Result<NodeId, SpecificationError> {
        let node = node.into();
        self.check_accepts(parent, &node)?;
        if let Node::Pipeline(p) = &node {
            self.pipeline_inputs(p)?;
        }
        let id = self.add(node);
        self.link(parent, id);
        Ok(id)
    }

    /// Make the unattached node `child` the last child of `parent`. This is
    /// the only way nodes become attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SpecificationError> {
        if let Some(current) = self.entries[child.0].parent {
            return Err(SpecificationError::AlreadyAttached {
                child: self.label(child),
                parent: self.label(current),
            });
        }
        if parent == child || self.ancestors(parent).any(|id| id == child) {
            return Err(SpecificationError::WouldCreateCycle {
                node: self.label(child),
            });
        }
        self.check_accepts(parent, &self.entries[child.0].node)?;
        self.link(parent, child);
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.entries[id.0].node
    }

    /// Nodes may be changed while the tree is being assembled, but not after
    /// their XML has been generated.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.entries[id.0].node
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entries[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.entries[id.0].children
    }

    /// All unattached nodes, in the order they were added.
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.entries.len())
            .map(NodeId)
            .filter(|&id| self.parent(id).is_none())
            .collect()
    }

    /// The position of `child` amongst the children of `parent`.
    pub fn child_id(&self, parent: NodeId, child: NodeId) -> Result<usize, SpecificationError> {
        self.entries[parent.0]
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or_else(|| SpecificationError::NotAChild {
                parent: self.node(parent).name().to_string(),
                child: self.node(child).name().to_string(),
            })
    }

    /// The dotted path of ancestor names and child positions leading to
    /// `id`, with whitespace in names replaced by underscores. Unique within
    /// the tree.
    pub fn label(&self, id: NodeId) -> String {
        let name = sanitize(self.node(id).name());
        match self.parent(id) {
            None => name,
            Some(parent) => {
                let position = self
                    .child_id(parent, id)
                    .expect("a node's parent always lists it as a child");
                format!("{}.{position}.{name}", self.label(parent))
            }
        }
    }

    /// 0 for unattached nodes.
    pub fn tree_depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// The label of the observation whose data `pipeline` processes.
    pub fn predecessor_label(&self, pipeline: NodeId) -> Result<String, SpecificationError> {
        match self.node(pipeline) {
            Node::Pipeline(p) => {
                let (observation, _) = self.pipeline_inputs(p)?;
                Ok(self.label(observation))
            }
            other => Err(SpecificationError::NoPredecessor {
                pipeline: other.name().to_string(),
            }),
        }
    }

    /// The XML of `id` and everything below it, indented by twice its depth.
    pub fn xml(&self, id: NodeId, project_name: &str) -> Result<String, SpecificationError> {
        let entry = &self.entries[id.0];
        let label = self.label(id);
        trace!("Generating XML for {} '{label}'", entry.node.kind());

        let (mut xml, suffix) = match &entry.node {
            Node::Folder(f) => (f.xml_prefix(), f.xml_suffix()),
            Node::Observation(o) => (o.xml_prefix(&label, project_name), o.xml_suffix()),
            Node::Beam(b) => (
                b.xml_prefix(&label, self.observation_of(id)?),
                b.xml_suffix(),
            ),
            Node::Pipeline(p) => {
                let (observation_id, beams) = self.pipeline_inputs(p)?;
                let predecessor_label = self.label(observation_id);
                let input_labels: Vec<String> = beams.iter().map(|&b| self.label(b)).collect();
                let flagging_strategy = match (&p.flagging_strategy, self.node(observation_id)) {
                    (Some(strategy), _) => strategy.clone(),
                    (None, Node::Observation(o)) => {
                        format!("{}default", o.antenna_set().band_name())
                    }
                    (None, _) => String::new(),
                };
                let context = PipelineContext {
                    label: &label,
                    predecessor_label: &predecessor_label,
                    input_labels: &input_labels,
                    flagging_strategy: &flagging_strategy,
                };
                (p.xml_prefix(&context), p.xml_suffix())
            }
        };

        if !entry.children.is_empty() {
            let children = entry
                .children
                .iter()
                .enumerate()
                .map(|(index, &child)| {
                    Ok(format!(
                        "\n<item index=\"{index}\">\n{}\n</item>",
                        self.xml(child, project_name)?
                    ))
                })
                .collect::<Result<Vec<_>, SpecificationError>>()?;
            xml.push_str(&format!("\n<children>{}\n</children>", children.join("\n")));
        }
        xml.push_str(suffix);

        Ok(indent(&xml, 2 * self.tree_depth(id) as isize))
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.entries.push(Entry {
            node,
            parent: None,
            children: vec![],
        });
        NodeId(self.entries.len() - 1)
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.entries[parent.0].children.push(child);
        self.entries[child.0].parent = Some(parent);
    }

    fn check_accepts(&self, parent: NodeId, child: &Node) -> Result<(), SpecificationError> {
        let parent = self.node(parent);
        if parent.accepts(child) {
            Ok(())
        } else {
            Err(SpecificationError::InvalidParent {
                child: child.kind(),
                parent: parent.kind(),
            })
        }
    }

    /// `id`'s parent, grandparent, and so on.
    fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&id| self.parent(id))
    }

    fn observation_of(&self, beam: NodeId) -> Result<&Observation, SpecificationError> {
        match self.parent(beam).map(|p| self.node(p)) {
            Some(Node::Observation(o)) => Ok(o),
            _ => Err(SpecificationError::BeamWithoutObservation {
                beam: self.node(beam).name().to_string(),
            }),
        }
    }

    /// The single observation `pipeline` reads from, and the beams it reads.
    fn pipeline_inputs(
        &self,
        pipeline: &AveragingPipeline,
    ) -> Result<(NodeId, Vec<NodeId>), SpecificationError> {
        let mut observations = BTreeSet::new();
        let mut beams = vec![];
        for &input in pipeline.inputs() {
            match self.node(input) {
                Node::Beam(b) => match self.parent(input) {
                    Some(parent) if matches!(self.node(parent), Node::Observation(_)) => {
                        observations.insert(parent);
                        beams.push(input);
                    }
                    _ => {
                        return Err(SpecificationError::BeamWithoutObservation {
                            beam: b.name().to_string(),
                        })
                    }
                },
                Node::Observation(_) => {
                    observations.insert(input);
                    beams.extend(
                        self.children(input)
                            .iter()
                            .filter(|&&c| matches!(self.node(c), Node::Beam(_))),
                    );
                }
                other => {
                    return Err(SpecificationError::InvalidPipelineInput {
                        pipeline: pipeline.name().to_string(),
                        kind: other.kind(),
                        name: other.name().to_string(),
                    })
                }
            }
        }

        if observations.len() > 1 {
            return Err(SpecificationError::MultiplePredecessors {
                pipeline: pipeline.name().to_string(),
                labels: observations.iter().map(|&o| self.label(o)).join(", "),
            });
        }
        let observation = observations.into_iter().next().ok_or_else(|| {
            SpecificationError::NoPredecessor {
                pipeline: pipeline.name().to_string(),
            }
        })?;
        if let Node::Observation(o) = self.node(observation) {
            if o.backend.need_beam_observation() {
                return Err(SpecificationError::NoUvDataProducts {
                    pipeline: pipeline.name().to_string(),
                    observation: self.label(observation),
                });
            }
        }
        let beams = beams.into_iter().unique().collect();
        debug!(
            "Pipeline '{}' reads from '{}'",
            pipeline.name(),
            self.label(observation)
        );
        Ok((observation, beams))
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}
