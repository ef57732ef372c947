/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use zune_photoshop::bytestream::{PsdReader, PsdWriter};
use zune_photoshop::tagged_blocks::{keys, SectionDividerKind, SectionDividerSetting};
use zune_photoshop::{
    ChannelImageData, Clipping, ColorMode, FileHeader, LayerInfo, LayerKind, LayerRecord,
    NodeKind, PsdDocument, PsdVersion, TaggedBlock, TaggedBlockData, TextEncoding
};

fn record(name: &str, clipping: Clipping) -> LayerRecord {
    let mut record = LayerRecord {
        clipping,
        ..LayerRecord::default()
    };
    record.set_name(name, TextEncoding::MacRoman);
    record
}

fn divider(name: &str, kind: SectionDividerKind) -> LayerRecord {
    let mut record = record(name, Clipping::Base);
    let mut setting = SectionDividerSetting::new(kind);
    setting.blend_mode = Some(*b"pass");

    let mut writer = PsdWriter::new();
    setting.write(&mut writer);
    record
        .tagged_blocks
        .insert(TaggedBlock::new(keys::SECTION_DIVIDER, writer.into_inner()));
    record
}

fn layer_info(records: Vec<LayerRecord>) -> LayerInfo {
    let channel_image_data = ChannelImageData {
        layers: vec![vec![]; records.len()]
    };
    LayerInfo {
        records,
        channel_image_data,
        ..LayerInfo::default()
    }
}

fn document(version: PsdVersion) -> PsdDocument {
    let header = FileHeader::new(version, 3, 2, 2, 8, ColorMode::RGB).unwrap();
    let mut document = PsdDocument::new(header);
    document
        .set_merged_image(&[vec![0; 4], vec![0; 4], vec![0; 4]])
        .unwrap();
    document
}

#[test]
fn test_negative_layer_count() {
    let mut info = layer_info(vec![
        record("a", Clipping::Base),
        record("b", Clipping::Base),
        record("c", Clipping::Base),
    ]);
    info.merged_alpha = true;
    assert_eq!(info.layer_count(), -3);

    let mut writer = PsdWriter::new();
    info.write(&mut writer, PsdVersion::Psd, None).unwrap();
    let bytes = writer.into_inner();
    assert_eq!(&bytes[4..6], &(-3_i16).to_be_bytes());

    let read = LayerInfo::read(&mut PsdReader::new(&bytes), PsdVersion::Psd)
        .unwrap()
        .unwrap();
    assert_eq!(read.len(), 3);
    assert!(read.merged_alpha);
    assert_eq!(read.records[2].name(TextEncoding::MacRoman), "c");
}

#[test]
fn test_group_tree_from_document() {
    let mut document = document(PsdVersion::Psd);
    for record in [
        record("Background", Clipping::Base),
        divider("</Layer group>", SectionDividerKind::BoundingSectionDivider),
        record("ChildA", Clipping::Base),
        record("ChildB", Clipping::NonBase),
        divider("Group 1", SectionDividerKind::OpenFolder),
    ] {
        document.push_layer(record, &[]).unwrap();
    }
    let bytes = document.write().unwrap();
    let document = PsdDocument::read(&bytes).unwrap();

    let records = document.layer_records();
    let tree = document.layer_tree();
    let name = |id: usize| tree.name(id, records, TextEncoding::MacRoman);

    assert!(tree.is_consistent());
    let root = tree.root();
    assert_eq!(root.children.len(), 2);
    assert_eq!(name(root.children[0]), "Background");

    let group_id = root.children[1];
    let group = tree.node(group_id).unwrap();
    assert_eq!(group.kind, NodeKind::Group);
    assert_eq!(name(group_id), "Group 1");
    assert_eq!(group.children.len(), 1);

    let child_a = tree.node(group.children[0]).unwrap();
    assert_eq!(child_a.kind, NodeKind::Layer(LayerKind::Pixel));
    assert_eq!(name(group.children[0]), "ChildA");
    assert_eq!(child_a.clip_layers.len(), 1);
    assert_eq!(name(child_a.clip_layers[0]), "ChildB");

    // the closing record carries the group settings
    let closing = &records[group.record.unwrap()];
    assert_eq!(closing.divider().unwrap().blend_mode, Some(*b"pass"));
}

#[test]
fn test_layers_from_nested_block() {
    let info = layer_info(vec![record("deep", Clipping::Base)]);

    for (version, length_size) in [(PsdVersion::Psd, 4), (PsdVersion::Psb, 8)] {
        let mut body = PsdWriter::new();
        info.write_body(&mut body, version).unwrap();
        let block = TaggedBlock::new(keys::LAYER_16, body.into_inner());

        let mut encoded = PsdWriter::new();
        block.write(&mut encoded, version, 4).unwrap();
        let encoded = encoded.into_inner();
        let length = u64::from_be_bytes({
            let mut bytes = [0; 8];
            bytes[8 - length_size..].copy_from_slice(&encoded[8..8 + length_size]);
            bytes
        });
        assert_eq!(length as usize, block.data.len());
        assert!(encoded.len() - 8 - length_size - block.data.len() < 4);

        let mut document = document(version);
        document
            .layer_and_mask_information
            .tagged_blocks
            .insert(block);

        let bytes = document.write().unwrap();
        let read = PsdDocument::read(&bytes).unwrap();
        assert!(read.layer_and_mask_information.layer_info.is_none());

        let records = read.layer_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(TextEncoding::MacRoman), "deep");

        match read
            .layer_and_mask_information
            .tagged_blocks
            .decode(keys::LAYER_16, version)
        {
            Some(TaggedBlockData::LayerInfo(nested)) => assert_eq!(nested.len(), 1),
            other => panic!("unexpected {other:?}")
        }
        assert_eq!(read.write().unwrap(), bytes);
    }
}

#[test]
fn test_unicode_name_wins() {
    let mut record = record("Ünïcode", Clipping::Base);
    record.name = b"legacy".to_vec();
    assert_eq!(record.name(TextEncoding::MacRoman), "Ünïcode");

    record.tagged_blocks.remove(keys::UNICODE_NAME);
    assert_eq!(record.name(TextEncoding::MacRoman), "legacy");
}

#[test]
fn test_classified_layers() {
    let mut adjustment = record("Levels", Clipping::Base);
    adjustment
        .tagged_blocks
        .insert(TaggedBlock::new(keys::LEVELS, vec![0, 2]));

    let mut text = record("Text", Clipping::Base);
    text.tagged_blocks
        .insert(TaggedBlock::new(keys::TYPE_TOOL, vec![0, 1]));

    let records = vec![adjustment, text, record("Pixels", Clipping::Base)];
    let tree = zune_photoshop::LayerTree::build(&records);
    let kinds: Vec<NodeKind> = tree
        .root()
        .children
        .iter()
        .map(|id| tree.node(*id).unwrap().kind)
        .collect();
    assert_eq!(
        kinds,
        [
            NodeKind::Layer(LayerKind::Adjustment),
            NodeKind::Layer(LayerKind::Type),
            NodeKind::Layer(LayerKind::Pixel)
        ]
    );
}
