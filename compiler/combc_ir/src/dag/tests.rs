use super::*;

#[test]
fn test_builder_produces_expected_shape() {
    let node = DagNode::new("G_MUL")
        .named("mul")
        .arg(DagArg::reference("dst"))
        .args([DagArg::typed("i32", "x"), DagArg::Literal(1)]);

    assert_eq!(node.operator, "G_MUL");
    assert_eq!(node.name.as_deref(), Some("mul"));
    assert_eq!(node.args.len(), 3);
    assert_eq!(
        node.args[1],
        DagArg::Ref {
            name: Some("x".into()),
            ty: Some("i32".into())
        }
    );
}

#[test]
fn test_anonymous_reference_has_no_name() {
    assert_eq!(
        DagArg::anonymous(),
        DagArg::Ref {
            name: None,
            ty: None
        }
    );
}
