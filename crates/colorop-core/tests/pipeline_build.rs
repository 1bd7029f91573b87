//! Integration tests for pipeline assembly and rollback.

use colorop_core::{
    build_pipeline, hdr_plane_pipeline, ColorOpProperty, ColorOpRegistry, ColorOpType, CurveType,
    ErrorKind, PropertyValue, StageDesc, SurfaceId,
};

const PLANE: SurfaceId = SurfaceId(31);

#[test]
fn hdr_pipeline_has_seven_linked_stages() {
    let mut reg = ColorOpRegistry::new();
    let entry = build_pipeline(&mut reg, PLANE, &hdr_plane_pipeline()).unwrap();
    let ids = reg.chain_from(entry.head).unwrap();

    let types: Vec<ColorOpType> = ids.iter().map(|id| reg.get(*id).unwrap().op_type()).collect();
    assert_eq!(
        types,
        vec![
            ColorOpType::OneDCurve,
            ColorOpType::Matrix3x4,
            ColorOpType::Multiplier,
            ColorOpType::OneDCurve,
            ColorOpType::OneDCurveLut,
            ColorOpType::OneDCurve,
            ColorOpType::OneDCurveLut,
        ]
    );

    for pair in ids.windows(2) {
        assert_eq!(
            reg.get_property(pair[0], ColorOpProperty::Next).unwrap(),
            PropertyValue::Object(Some(pair[1]))
        );
    }
    let last = *ids.last().unwrap();
    assert_eq!(reg.get_property(last, ColorOpProperty::Next).unwrap(), PropertyValue::Object(None));
    assert_eq!(entry.name, format!("Color Pipeline {}", entry.head.get()));
}

#[test]
fn every_stage_starts_bypassed_with_defaults() {
    let mut reg = ColorOpRegistry::new();
    let entry = build_pipeline(&mut reg, PLANE, &hdr_plane_pipeline()).unwrap();
    let ids = reg.chain_from(entry.head).unwrap();

    for id in &ids {
        assert_eq!(reg.get_property(*id, ColorOpProperty::Bypass).unwrap(), PropertyValue::Bool(true));
    }
    assert_eq!(
        reg.get_property(ids[0], ColorOpProperty::CurveType).unwrap(),
        PropertyValue::Curve(CurveType::SrgbEotf)
    );
    assert_eq!(
        reg.get_property(ids[3], ColorOpProperty::CurveType).unwrap(),
        PropertyValue::Curve(CurveType::SrgbInvEotf)
    );
    assert_eq!(reg.get_property(ids[2], ColorOpProperty::Multiplier).unwrap(), PropertyValue::U64(0));
    assert_eq!(reg.get_property(ids[4], ColorOpProperty::Size).unwrap(), PropertyValue::U32(4096));
    assert_eq!(reg.get_property(ids[1], ColorOpProperty::Data).unwrap(), PropertyValue::Blob(None));
}

#[test]
fn allocation_failure_at_any_stage_leaves_nothing() {
    let stages = hdr_plane_pipeline();
    for k in 0..stages.len() {
        let mut reg = ColorOpRegistry::with_capacity_limit(k);
        let err = build_pipeline(&mut reg, PLANE, &stages).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceExhausted, "stage {k}");
        assert!(reg.is_empty(), "stage {k} leaked {} nodes", reg.len());
    }
}

#[test]
fn failure_leaves_existing_nodes_alone() {
    let mut reg = ColorOpRegistry::with_capacity_limit(10);
    let first = build_pipeline(&mut reg, PLANE, &hdr_plane_pipeline()).unwrap();
    let before: Vec<_> = reg.iter().map(|op| op.id()).collect();

    // Only three slots remain.
    assert!(build_pipeline(&mut reg, PLANE, &hdr_plane_pipeline()).is_err());
    let after: Vec<_> = reg.iter().map(|op| op.id()).collect();
    assert_eq!(before, after);
    assert_eq!(reg.chain_from(first.head).unwrap().len(), 7);
}

#[test]
fn invalid_curve_set_allocates_nothing() {
    let mut reg = ColorOpRegistry::new();
    for bits in [0u64, 1 << 8, u64::MAX] {
        let err = reg.init_curve_bits(PLANE, bits, true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
    assert!(reg.is_empty());

    let stages = vec![
        StageDesc::Multiplier { allow_bypass: true },
        StageDesc::Curve {
            supported: 0,
            allow_bypass: true,
        },
    ];
    assert_eq!(
        build_pipeline(&mut reg, PLANE, &stages).unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
    assert!(reg.is_empty());
}

#[test]
fn release_surface_tears_down_pipelines() {
    let mut reg = ColorOpRegistry::new();
    build_pipeline(&mut reg, PLANE, &hdr_plane_pipeline()).unwrap();
    let other = build_pipeline(&mut reg, SurfaceId(32), &hdr_plane_pipeline()).unwrap();

    assert_eq!(reg.release_surface(PLANE), 7);
    assert_eq!(reg.len(), 7);
    assert_eq!(reg.chain_from(other.head).unwrap().len(), 7);
    assert_eq!(reg.release_surface(PLANE), 0);
}
