//! Whole-container round trips over synthetic animation documents.

use bxlyt::anim::{
    AnimGroup, AnimSubGroup, AnimTargetType, AnimTrack, AnimationInfo, CurveType, KeyFrame,
    TagInfo,
};
use bxlyt::header::BOM_BIG;
use bxlyt::{AnimDocument, Header, SectionTag, UnsupportedSection, Variant, Version};

fn header(variant: Variant, major: u8) -> Header {
    Header {
        variant,
        byte_order_mark: BOM_BIG,
        version: Version::new(major, 0, 0),
        reversed_tags: false,
        header_size: if variant == Variant::Rev { 16 } else { 20 },
    }
}

fn track(curve: CurveType, keys: &[(f32, f32)]) -> AnimTrack {
    AnimTrack {
        index: 0,
        target: 0,
        curve,
        keys: keys
            .iter()
            .map(|&(frame, value)| KeyFrame {
                frame,
                value,
                slope: 0.0,
            })
            .collect(),
    }
}

fn sample_doc(variant: Variant, major: u8) -> AnimDocument {
    let prefix = match variant {
        Variant::Cafe => b'F',
        Variant::Ctr => b'C',
        Variant::Rev => b'R',
    };
    let kind = |rest: &[u8; 3]| SectionTag([prefix, rest[0], rest[1], rest[2]]);

    let mut doc = AnimDocument::new(header(variant, major));
    doc.tag_info = Some(TagInfo {
        order: 2,
        name: "anim_in".into(),
        start_frame: 0,
        end_frame: 30,
        child_binding: false,
        unknown: [0; 3],
        groups: vec!["G_all".into()],
        user_data: None,
    });
    doc.animation = Some(AnimationInfo {
        frame_size: 30,
        loops: true,
        textures: vec!["sprite_00.tex".into()],
        groups: vec![
            AnimGroup {
                name: "N_icon".into(),
                target: AnimTargetType::Pane,
                sub_groups: vec![
                    AnimSubGroup {
                        kind: kind(b"LPA"),
                        tracks: vec![
                            track(CurveType::Hermite, &[(0.0, 0.0), (30.0, 128.0)]),
                            track(CurveType::Step, &[(0.0, 1.0)]),
                        ],
                    },
                    AnimSubGroup {
                        kind: kind(b"LVI"),
                        tracks: vec![track(CurveType::Step, &[(0.0, 1.0), (15.0, 0.0)])],
                    },
                ],
                ..AnimGroup::default()
            },
            AnimGroup {
                name: "M_icon".into(),
                target: AnimTargetType::Material,
                sub_groups: vec![AnimSubGroup {
                    kind: kind(b"LTP"),
                    tracks: vec![track(CurveType::Step, &[(0.0, 0.0), (10.0, 1.0)])],
                }],
                ..AnimGroup::default()
            },
        ],
    });
    doc
}

#[test]
fn animation_round_trips_all_variants() {
    for (variant, major) in [(Variant::Cafe, 8), (Variant::Ctr, 2), (Variant::Rev, 1)] {
        let doc = sample_doc(variant, major);
        let first = doc.encode().unwrap();
        let decoded = AnimDocument::decode(&first).unwrap();
        let second = decoded.encode().unwrap();
        assert_eq!(first, second, "{variant:?} not byte-identical");

        let anim = decoded.animation.as_ref().unwrap();
        assert_eq!(anim.frame_size, 30);
        assert!(anim.loops);
        assert_eq!(anim.groups.len(), 2);
        assert_eq!(anim.groups[0].sub_groups.len(), 2);
        assert_eq!(
            decoded.tag_info.as_ref().unwrap().name,
            doc.tag_info.as_ref().unwrap().name
        );
    }
}

#[test]
fn user_target_groups_survive_the_extra_indirection() {
    let mut doc = sample_doc(Variant::Cafe, 8);
    doc.animation.as_mut().unwrap().groups.push(AnimGroup {
        name: "U_speed".into(),
        target: AnimTargetType::User,
        sub_groups: vec![AnimSubGroup {
            kind: SectionTag(*b"FLEU"),
            tracks: vec![track(CurveType::Constant, &[(0.0, 2.5)])],
        }],
        user_value: 4,
        user_name: "speed".into(),
    });

    let first = doc.encode().unwrap();
    let decoded = AnimDocument::decode(&first).unwrap();
    let group = &decoded.animation.as_ref().unwrap().groups[2];
    assert_eq!(group.target, AnimTargetType::User);
    assert_eq!(group.user_name, "speed");
    assert_eq!(group.sub_groups[0].tracks[0].keys[0].value, 2.5);
    assert_eq!(decoded.encode().unwrap(), first);
}

#[test]
fn step_values_quantize_to_u16() {
    let mut doc = sample_doc(Variant::Cafe, 8);
    doc.animation.as_mut().unwrap().groups[0].sub_groups[1].tracks[0] =
        track(CurveType::Step, &[(0.0, 300.7)]);

    let bytes = doc.encode().unwrap();
    let decoded = AnimDocument::decode(&bytes).unwrap();
    let key = decoded.animation.as_ref().unwrap().groups[0].sub_groups[1].tracks[0].keys[0];
    assert_eq!(key.value, 300.0);
}

#[test]
fn tag_user_data_gated_on_version() {
    use bxlyt::userdata::{UserData, UserDataEntry, UserDataValue};

    let mut doc = sample_doc(Variant::Cafe, 8);
    doc.tag_info.as_mut().unwrap().user_data = Some(UserData {
        entries: vec![UserDataEntry {
            name: "loop_hint".into(),
            value: UserDataValue::Ints(vec![1]),
            reserved: 0,
        }],
        raw: None,
    });

    let bytes = doc.encode().unwrap();
    let decoded = AnimDocument::decode(&bytes).unwrap();
    assert!(decoded.tag_info.as_ref().unwrap().user_data.is_some());
    assert_eq!(decoded.encode().unwrap(), bytes);

    // v2 files have no user-data slot in the tag record
    let mut old = sample_doc(Variant::Ctr, 2);
    old.tag_info.as_mut().unwrap().user_data = Some(UserData::default());
    let bytes = old.encode().unwrap();
    let decoded = AnimDocument::decode(&bytes).unwrap();
    assert!(decoded.tag_info.as_ref().unwrap().user_data.is_none());
}

#[test]
fn unknown_sections_pass_through() {
    let mut doc = sample_doc(Variant::Cafe, 8);
    doc.unsupported.push(UnsupportedSection {
        tag: SectionTag(*b"zzzz"),
        data: vec![9, 8, 7, 6],
    });
    let bytes = doc.encode().unwrap();
    let decoded = AnimDocument::decode(&bytes).unwrap();
    assert_eq!(decoded.unsupported[0].data, [9, 8, 7, 6]);
    assert_eq!(decoded.encode().unwrap(), bytes);
}

#[test]
fn reversed_animation_magic() {
    let mut doc = sample_doc(Variant::Rev, 1);
    doc.header.reversed_tags = true;
    doc.header.byte_order_mark = bxlyt::header::BOM_LITTLE;

    let bytes = doc.encode().unwrap();
    assert_eq!(&bytes[..4], b"NALR");
    let decoded = AnimDocument::decode(&bytes).unwrap();
    assert!(decoded.header.reversed_tags);
    assert_eq!(decoded.encode().unwrap(), bytes);
}
