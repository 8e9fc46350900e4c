//! XML UI descriptions go through the same builder as JSON ones and must
//! produce the same parameters, rename table and panel.

use faust_td::host::{ParameterSet, RenameTable, WidgetTree};
use faust_td::parameter::ParKind;
use faust_td::{BuilderConfig, ErrorKind, UiBuilder, UiDescription, UiNode};

const XML: &str = r#"<?xml version="1.0"?>
<faust>
  <name>organ</name>
  <author>someone &amp; co</author>
  <inputs>0</inputs>
  <outputs>2</outputs>
  <ui>
    <activewidgets>
      <count>3</count>
      <widget type="vslider" id="1">
        <label>Volume (dB)</label>
        <varname>fslider0</varname>
        <init>-6.0f</init>
        <min>-70.0f</min>
        <max>4.0f</max>
        <step>0.1f</step>
        <meta key="style">knob</meta>
        <meta key="tooltip">Output
          level</meta>
      </widget>
      <widget type="nentry" id="2">
        <label>Shape</label>
        <varname>fentry0</varname>
        <init>1</init>
        <min>0</min>
        <max>2</max>
        <step>1</step>
        <meta key="style">menu{'Sine':0;'Square':1;'Saw':2}</meta>
      </widget>
      <widget type="button" id="3">
        <label>Panic</label>
        <varname>fbutton0</varname>
      </widget>
    </activewidgets>
    <passivewidgets>
      <count>1</count>
      <widget type="vbargraph" id="4">
        <label>out</label>
        <varname>fbargraph0</varname>
        <min>-60</min>
        <max>0</max>
      </widget>
    </passivewidgets>
    <layout>
      <group type="vgroup">
        <label>organ</label>
        <widgetref id="1" />
        <!-- the tone group -->
        <group type="hgroup">
          <label>tone</label>
          <widgetref id="2" />
          <widgetref id="3" />
        </group>
        <widgetref id="4" />
      </group>
    </layout>
  </ui>
</faust>"#;

const JSON: &str = r#"{
  "name": "organ",
  "inputs": 0,
  "outputs": 2,
  "ui": [ { "type": "vgroup", "label": "organ", "items": [
    { "type": "vslider", "label": "Volume (dB)", "address": "/organ/Volume (dB)",
      "meta": [ { "style": "knob" }, { "tooltip": "Output level" } ],
      "init": -6, "min": -70, "max": 4, "step": 0.1 },
    { "type": "hgroup", "label": "tone", "items": [
      { "type": "nentry", "label": "Shape", "address": "/organ/tone/Shape",
        "meta": [ { "style": "menu{'Sine':0;'Square':1;'Saw':2}" } ],
        "init": 1, "min": 0, "max": 2, "step": 1 },
      { "type": "button", "label": "Panic", "address": "/organ/tone/Panic" }
    ] },
    { "type": "vbargraph", "label": "out", "address": "/organ/out", "min": -60, "max": 0 }
  ] } ]
}"#;

fn build(text: &str) -> (ParameterSet, WidgetTree, RenameTable) {
    let mut params = ParameterSet::new();
    let mut tree = WidgetTree::new();
    let mut renames = RenameTable::new();
    UiBuilder::new(BuilderConfig::default())
        .build_ui(text, &mut params, Some(&mut tree), &mut renames)
        .unwrap();
    (params, tree, renames)
}

#[test]
fn document_header_fields() {
    let doc = UiDescription::parse(XML).unwrap();
    assert_eq!(doc.name.as_deref(), Some("organ"));
    assert_eq!(doc.inputs, Some(0));
    assert_eq!(doc.outputs, Some(2));
    assert_eq!(doc.ui.len(), 1);
    assert!(matches!(&doc.ui[0], UiNode::Group(g) if g.items.len() == 3));
}

#[test]
fn xml_builds_like_json() {
    let (xml_params, xml_tree, xml_renames) = build(XML);
    let (json_params, json_tree, json_renames) = build(JSON);

    assert_eq!(xml_params, json_params);
    assert_eq!(xml_renames, json_renames);
    assert_eq!(xml_tree.outline(), json_tree.outline());
}

#[test]
fn xml_parameters() {
    let (params, _, renames) = build(XML);
    let names: Vec<_> = params.parameters().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Volumedb", "Shape"]);
    assert_eq!(renames.address_of("Volumedb"), Some("/organ/Volume_dB"));

    let volume = params.get("Volumedb").unwrap();
    assert_eq!(volume.help.as_deref(), Some("Output level"));
    let ParKind::Float(range) = &volume.kind else {
        panic!("expected float");
    };
    assert_eq!((range.min, range.max, range.default), (-70.0, 4.0, -6.0));

    let ParKind::Menu { items, default } = &params.get("Shape").unwrap().kind else {
        panic!("expected menu");
    };
    assert_eq!(items.len(), 3);
    assert_eq!(items[*default].name, "Square");
}

#[test]
fn malformed_xml_reports_position() {
    let mut params = ParameterSet::new();
    let mut renames = RenameTable::new();
    let err = UiBuilder::new(BuilderConfig::default())
        .build_ui::<_, WidgetTree, _>(
            "<faust>\n  <ui>\n    <layout>\n  </ui>\n</faust>",
            &mut params,
            None,
            &mut renames,
        )
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ParseError);
    assert!(err.line > 0);
    assert!(params.is_empty());
}

#[test]
fn unknown_xml_widget_type() {
    let doc = r#"<faust><ui>
      <activewidgets><widget type="rotary" id="1"><label>x</label></widget></activewidgets>
      <layout><group type="vgroup"><label>g</label><widgetref id="1"/></group></layout>
    </ui></faust>"#;
    let err = UiDescription::parse(doc).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownWidget);
}
