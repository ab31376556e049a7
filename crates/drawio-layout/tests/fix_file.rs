//! Rewriting diagrams on disk

use std::fs;

use drawio_layout::{fix_layout, CoordinateMap, FixOptions, LayoutError};
use pretty_assertions::assert_eq;

const DIAGRAM: &str = r#"<mxfile host="app.diagrams.net">
  <diagram id="d1" name="Page-1">
    <mxGraphModel>
      <root>
        <mxCell id="0"/>
        <mxCell id="1" parent="0"/>
        <mxCell id="EoEyUaqDCjdvldWjgz71-1" value="admin" vertex="1" parent="1">
          <mxGeometry x="300" y="300" width="180" height="150" as="geometry"/>
        </mxCell>
        <mxCell id="EoEyUaqDCjdvldWjgz71-15" value="thanas" vertex="1" parent="1">
          <mxGeometry x="10" y="10" width="180" height="150" as="geometry"/>
        </mxCell>
        <mxCell id="edge-1" style="endArrow=none;" edge="1" parent="1" source="EoEyUaqDCjdvldWjgz71-1" target="EoEyUaqDCjdvldWjgz71-15">
          <mxGeometry relative="1" as="geometry">
            <Array as="points"><mxPoint x="1" y="2"/></Array>
          </mxGeometry>
        </mxCell>
      </root>
    </mxGraphModel>
  </diagram>
</mxfile>
"#;

fn small_map() -> CoordinateMap {
    CoordinateMap::from_points([("EoEyUaqDCjdvldWjgz71-1", 40.0, 40.0)]).unwrap()
}

#[test]
fn test_file_is_rewritten_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("finaderdiagram.drawio");
    fs::write(&path, DIAGRAM).unwrap();

    let summary = fix_layout(&path, &small_map(), FixOptions::default()).unwrap();
    assert_eq!(summary.repositioned, 1);
    assert_eq!(summary.waypoints_cleared, 1);
    assert_eq!(summary.styles_normalized, 1);

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains(r#"<mxGeometry x="40" y="40" width="180" height="150" as="geometry"/>"#));
    assert!(written.contains(r#"<mxGeometry x="10" y="10" width="180" height="150" as="geometry"/>"#));
    assert!(!written.contains("<Array"));
    assert!(written.contains(r#"style="edgeStyle=orthogonalEdgeStyle;rounded=0;orthogonalLoop=1;jettySize=auto;html=1;endArrow=none;""#));

    // no temporary files are left behind
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_second_run_leaves_file_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diagram.drawio");
    fs::write(&path, DIAGRAM).unwrap();

    fix_layout(&path, &small_map(), FixOptions::default()).unwrap();
    let first = fs::read_to_string(&path).unwrap();
    fix_layout(&path, &small_map(), FixOptions::default()).unwrap();
    let second = fs::read_to_string(&path).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diagram.drawio");
    fs::write(&path, DIAGRAM).unwrap();

    let options = FixOptions {
        dry_run: true,
        ..FixOptions::default()
    };
    let summary = fix_layout(&path, &small_map(), options).unwrap();

    assert_eq!(summary.repositioned, 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), DIAGRAM);
}

#[test]
fn test_builtin_layout_reports_unknown_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diagram.drawio");
    fs::write(&path, DIAGRAM).unwrap();

    let map = CoordinateMap::builtin().unwrap();
    let summary = fix_layout(&path, &map, FixOptions::default()).unwrap();

    assert_eq!(summary.repositioned, 2);
    assert_eq!(summary.missing.len(), 22);
    assert!(!summary.missing.contains(&"EoEyUaqDCjdvldWjgz71-15".to_string()));
}

#[test]
fn test_strict_mode_fails_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diagram.drawio");
    fs::write(&path, DIAGRAM).unwrap();

    let map = CoordinateMap::from_points([("EoEyUaqDCjdvldWjgz71-1", 1.0, 1.0), ("ghost", 2.0, 2.0)])
        .unwrap();
    let options = FixOptions {
        strict: true,
        ..FixOptions::default()
    };

    let err = fix_layout(&path, &map, options).unwrap_err();
    match &err {
        LayoutError::MissingNodes(ids) => assert_eq!(ids, &vec!["ghost".to_string()]),
        other => panic!("expected MissingNodes, got {:?}", other),
    }
    assert_eq!(err.exit_code(), 5);
    assert_eq!(fs::read_to_string(&path).unwrap(), DIAGRAM);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = fix_layout(dir.path().join("nope.drawio"), &small_map(), FixOptions::default())
        .unwrap_err();

    assert!(matches!(err, LayoutError::NotFound(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_malformed_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.drawio");
    fs::write(&path, "<mxfile><diagram></mxfile>").unwrap();

    let err = fix_layout(&path, &small_map(), FixOptions::default()).unwrap_err();
    assert!(matches!(err, LayoutError::Parse { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), "<mxfile><diagram></mxfile>");
}

#[test]
fn test_incomplete_documents_fail_and_stay_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let truncated = r#"<mxfile><diagram><mxGraphModel><root><mxCell id="EoEyUaqDCjdvldWjgz71-1" vertex="1"><mxGeometry x="0" y="0" as="geometry"/>"#;

    for (name, content) in [("empty", ""), ("text", "hello world"), ("truncated", truncated)] {
        let path = dir.path().join(format!("{}.drawio", name));
        fs::write(&path, content).unwrap();

        let err = fix_layout(&path, &small_map(), FixOptions::default()).unwrap_err();
        assert!(matches!(err, LayoutError::Parse { .. }), "{}: {:?}", name, err);
        assert_eq!(err.exit_code(), 3);
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }
}

#[test]
fn test_non_utf8_file_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("binary.drawio");
    let content = b"<mxfile>\xff</mxfile>";
    fs::write(&path, content).unwrap();

    let err = fix_layout(&path, &small_map(), FixOptions::default()).unwrap_err();
    assert!(matches!(err, LayoutError::Parse { .. }));
    assert!(err.to_string().contains("not valid UTF-8"));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(fs::read(&path).unwrap(), content);
}

#[test]
fn test_layout_file_roundtrip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let layout = dir.path().join("layout.toml");
    fs::write(
        &layout,
        "[[node]]\nid = \"EoEyUaqDCjdvldWjgz71-15\"\nname = \"thanas\"\nx = 40\ny = 360\n",
    )
    .unwrap();

    let map = CoordinateMap::from_file(&layout).unwrap();
    let path = dir.path().join("diagram.drawio");
    fs::write(&path, DIAGRAM).unwrap();
    fix_layout(&path, &map, FixOptions::default()).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains(r#"<mxGeometry x="40" y="360" width="180" height="150" as="geometry"/>"#));
}
