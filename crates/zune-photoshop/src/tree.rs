/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Layer tree reconstruction
//!
//! Layer records are stored flat, bottom most layer first. Groups are
//! delimited by records carrying a section divider block: a bounding
//! divider opens a group and the matching open or closed folder record
//! closes it, that closing record also holds the group's name, opacity,
//! blend mode and visibility.
//!
//! Records with non base clipping are attached to the closest base layer
//! before them in the same group instead of becoming children.
//!
//! The tree is an arena, nodes refer to each other and to layer records
//! by index.
use log::warn;

use crate::constants::Clipping;
use crate::encoding::TextEncoding;
use crate::layer_record::{LayerFlags, LayerRecord};
use crate::tagged_blocks::{keys, SectionDividerKind};

/// Kind of a leaf layer
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayerKind {
    Pixel,
    Shape,
    Type,
    SmartObject,
    Adjustment
}

impl LayerKind {
    /// Classify a record by the tagged blocks it carries
    pub fn classify(record: &LayerRecord) -> LayerKind {
        let blocks = &record.tagged_blocks;
        let has_any = |keys: &[[u8; 4]]| keys.iter().any(|key| blocks.contains(*key));

        if blocks.contains(keys::TYPE_TOOL) || blocks.contains(keys::TYPE_TOOL_LEGACY) {
            LayerKind::Type
        } else if has_any(&keys::VECTOR_KEYS)
            && record.flags.contains(LayerFlags::PIXEL_DATA_IRRELEVANT)
        {
            LayerKind::Shape
        } else if has_any(&keys::SMART_OBJECT_KEYS) {
            LayerKind::SmartObject
        } else if has_any(&keys::ADJUSTMENT_KEYS) {
            LayerKind::Adjustment
        } else {
            LayerKind::Pixel
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// The document itself, always node 0
    Root,
    Group,
    Layer(LayerKind)
}

#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerNode {
    pub kind:        NodeKind,
    /// Record describing this node. For groups this is the folder record
    /// that closed it, `None` for groups that were never closed
    pub record:      Option<usize>,
    /// Bounding divider record that opened a group
    pub divider:     Option<usize>,
    pub parent:      Option<usize>,
    /// Children bottom most first
    pub children:    Vec<usize>,
    /// Layers clipped to this one, bottom most first
    pub clip_layers: Vec<usize>
}

impl LayerNode {
    fn new(kind: NodeKind, record: Option<usize>, parent: Option<usize>) -> LayerNode {
        LayerNode {
            kind,
            record,
            divider: None,
            parent,
            children: vec![],
            clip_layers: vec![]
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Root | NodeKind::Group)
    }
}

struct Frame {
    node:      usize,
    /// Last base layer added to this frame, target of clip layers
    last_base: Option<usize>
}

/// Group and layer hierarchy built from the flat layer records
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerTree {
    nodes:      Vec<LayerNode>,
    consistent: bool
}

impl LayerTree {
    pub const ROOT: usize = 0;

    /// Build the tree from records in file order
    pub fn build(records: &[LayerRecord]) -> LayerTree {
        let mut tree = LayerTree {
            nodes:      vec![LayerNode::new(NodeKind::Root, None, None)],
            consistent: true
        };
        let mut stack = vec![Frame {
            node:      Self::ROOT,
            last_base: None
        }];

        for (index, record) in records.iter().enumerate() {
            let divider = record.divider().map(|d| d.kind);

            match divider {
                Some(SectionDividerKind::BoundingSectionDivider) => {
                    let parent = stack.last().map(|f| f.node);
                    let node = tree.push(NodeKind::Group, None, parent);
                    tree.nodes[node].divider = Some(index);
                    stack.push(Frame {
                        node,
                        last_base: None
                    });
                }
                Some(kind) if kind.is_folder() => {
                    let group = if stack.len() > 1 {
                        stack.pop().map(|f| f.node).unwrap_or(Self::ROOT)
                    } else {
                        warn!(
                            "Group end at layer record {} without a start, grouping the layers below it",
                            index
                        );
                        tree.consistent = false;
                        tree.wrap_root_children()
                    };
                    tree.nodes[group].record = Some(index);

                    if let Some(frame) = stack.last_mut() {
                        tree.attach(frame, group, record.clipping);
                    }
                }
                _ => {
                    let parent = stack.last().map(|f| f.node);
                    let kind = LayerKind::classify(record);
                    let node = tree.push(NodeKind::Layer(kind), Some(index), parent);

                    if let Some(frame) = stack.last_mut() {
                        tree.attach(frame, node, record.clipping);
                    }
                }
            }
        }

        // groups opened by a bounding divider but never closed
        while stack.len() > 1 {
            if let Some(frame) = stack.pop() {
                warn!("Closing group that has no end record");
                tree.consistent = false;
                if let Some(parent) = stack.last_mut() {
                    tree.attach(parent, frame.node, Clipping::Base);
                }
            }
        }
        tree
    }

    fn push(&mut self, kind: NodeKind, record: Option<usize>, parent: Option<usize>) -> usize {
        self.nodes.push(LayerNode::new(kind, record, parent));
        self.nodes.len() - 1
    }

    /// Add `node` to a frame, as a child or as a clip layer
    fn attach(&mut self, frame: &mut Frame, node: usize, clipping: Clipping) {
        match (clipping, frame.last_base) {
            (Clipping::NonBase, Some(base)) => {
                self.nodes[base].clip_layers.push(node);
                self.nodes[node].parent = Some(frame.node);
            }
            _ => {
                self.nodes[frame.node].children.push(node);
                self.nodes[node].parent = Some(frame.node);
                frame.last_base = Some(node);
            }
        }
    }

    /// Move every child of the root into a new group, returning it
    fn wrap_root_children(&mut self) -> usize {
        let group = self.push(NodeKind::Group, None, Some(Self::ROOT));
        let children = std::mem::take(&mut self.nodes[Self::ROOT].children);

        for child in &children {
            self.nodes[*child].parent = Some(group);
        }
        // clip layers keep pointing at their base, only their parent moves
        for child in &children {
            let clips = self.nodes[*child].clip_layers.clone();
            for clip in clips {
                self.nodes[clip].parent = Some(group);
            }
        }
        self.nodes[group].children = children;
        group
    }

    pub fn root(&self) -> &LayerNode {
        &self.nodes[Self::ROOT]
    }

    pub fn node(&self, id: usize) -> Option<&LayerNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[LayerNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// False when dividers did not pair up and the tree was repaired
    pub fn is_consistent(&self) -> bool {
        self.consistent
    }

    /// Name of a node, groups without a closing record are unnamed
    pub fn name(&self, id: usize, records: &[LayerRecord], encoding: TextEncoding) -> String {
        self.node(id)
            .and_then(|node| node.record)
            .and_then(|record| records.get(record))
            .map(|record| record.name(encoding))
            .unwrap_or_default()
    }

    /// Node ids in depth first order, each node followed by its clip
    /// layers and then its children. The root is not included
    pub fn walk(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut pending: Vec<usize> = self.root().children.iter().rev().copied().collect();

        while let Some(id) = pending.pop() {
            order.push(id);
            let node = &self.nodes[id];
            pending.extend(node.children.iter().rev());
            pending.extend(node.clip_layers.iter().rev());
        }
        order
    }
}
