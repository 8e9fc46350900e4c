//! End-to-end builder tests: JSON description to parameters, panel and
//! rename table, through the in-memory hosts.

use faust_td::host::{ParameterHost, ParameterSet, RenameTable, WidgetHost, WidgetTree};
use faust_td::parameter::ParKind;
use faust_td::{BuilderConfig, ErrorKind, UiBuilder};

/// Helper: a fresh builder plus empty host containers.
struct Rig {
    builder: UiBuilder,
    params: ParameterSet,
    tree: WidgetTree,
    renames: RenameTable,
}

impl Rig {
    fn new(config: BuilderConfig) -> Self {
        Self {
            builder: UiBuilder::new(config),
            params: ParameterSet::new(),
            tree: WidgetTree::new(),
            renames: RenameTable::new(),
        }
    }

    fn build(&mut self, json: &str) -> Result<faust_td::BuildReport, faust_td::BuildError> {
        self.builder
            .build_ui(json, &mut self.params, Some(&mut self.tree), &mut self.renames)
    }

    fn names(&self) -> Vec<String> {
        self.params.parameters().map(|p| p.name.clone()).collect()
    }
}

fn polyphonic(group_voices: bool) -> BuilderConfig {
    BuilderConfig {
        polyphony: true,
        group_voices,
        ..BuilderConfig::default()
    }
}

const SYNTH: &str = r#"{
  "name": "synth",
  "ui": [ {
    "type": "vgroup",
    "label": "synth",
    "items": [
      { "type": "hslider", "label": "Gain", "address": "/synth/Gain",
        "init": 0.5, "min": 0, "max": 1, "step": 0.01 },
      { "type": "hgroup", "label": "Filter (LP)",
        "items": [
          { "type": "vslider", "label": "Cutoff", "address": "/synth/Filter (LP)/Cutoff",
            "meta": [ { "style": "knob" }, { "tooltip": "Cutoff   frequency" } ],
            "init": 1000, "min": 20, "max": 20000, "step": 1 },
          { "type": "hslider", "label": "Gain", "address": "/synth/Filter (LP)/Gain",
            "init": 0, "min": -24, "max": 24, "step": 0.1 }
        ] },
      { "type": "nentry", "label": "Wave", "address": "/synth/Wave",
        "meta": [ { "style": "menu{'Noise':0;'Sawtooth':1;'Triangle':2}" } ],
        "init": 1, "min": 0, "max": 2, "step": 1 },
      { "type": "button", "label": "3db boost", "address": "/synth/3db boost" },
      { "type": "hbargraph", "label": "level", "address": "/synth/level", "min": -60, "max": 0 }
    ]
  } ]
}"#;

// =============================================================================
// Idempotence and teardown
// =============================================================================

#[test]
fn building_twice_is_idempotent() {
    let mut rig = Rig::new(BuilderConfig::default());
    rig.params.add_page("Settings");
    rig.params
        .append_parameter(
            "Settings",
            &faust_td::parameter::Parameter {
                name: "Polyphony".into(),
                label: "Polyphony".into(),
                help: None,
                kind: ParKind::Toggle { default: false },
            },
        )
        .unwrap();

    rig.build(SYNTH).unwrap();
    let params_first = rig.params.clone();
    let renames_first = rig.renames.clone();
    let outline_first = rig.tree.outline();

    rig.build(SYNTH).unwrap();
    assert_eq!(rig.params, params_first);
    assert_eq!(rig.renames, renames_first);
    assert_eq!(rig.tree.outline(), outline_first);
    assert!(rig.params.get("Polyphony").is_some(), "other pages survive");
}

#[test]
fn empty_input_clears_everything() {
    let mut rig = Rig::new(BuilderConfig::default());
    rig.build(SYNTH).unwrap();
    assert!(!rig.params.is_empty());
    assert!(!rig.tree.is_empty());

    let report = rig.build("").unwrap();
    assert_eq!(report.parameters, 0);
    assert!(rig.params.is_empty());
    assert!(rig.params.page("Control").is_some());
    assert!(rig.tree.is_empty());
    assert!(rig.renames.is_empty());
}

#[test]
fn malformed_input_leaves_empty_state() {
    let mut rig = Rig::new(BuilderConfig::default());
    rig.build(SYNTH).unwrap();

    let err = rig.build(r#"{"ui": [ { "type": "vgroup" "#).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ParseError);
    assert!(rig.params.is_empty());
    assert!(rig.tree.is_empty());
    assert!(rig.renames.is_empty());
}

#[test]
fn unknown_widget_type_is_fatal() {
    let mut rig = Rig::new(BuilderConfig::default());
    let err = rig
        .build(r#"{"ui":[{"type":"vgroup","label":"g","items":[{"type":"xypad","label":"p","address":"/g/p"}]}]}"#)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownWidget);
    assert!(err.to_string().contains("xypad"));
    assert!(rig.params.is_empty());
}

// =============================================================================
// Naming and deduplication
// =============================================================================

#[test]
fn names_are_legal_and_unique() {
    let mut rig = Rig::new(BuilderConfig::default());
    rig.build(SYNTH).unwrap();
    assert_eq!(rig.names(), vec!["Gain", "Cutoff", "Gain1", "Wave", "P3dbboost"]);
    assert_eq!(
        rig.renames.address_of("Cutoff"),
        Some("/synth/Filter_LP/Cutoff")
    );
    assert_eq!(rig.renames.address_of("P3dbboost"), Some("/synth/3db_boost"));
}

#[test]
fn duplicate_address_yields_one_parameter() {
    let json = r#"{"ui":[{"type":"vgroup","label":"dup","items":[
        {"type":"hslider","label":"Freq","address":"/dup/Freq","min":20,"max":2000,"init":440,"step":1},
        {"type":"hgroup","label":"mirror","items":[
            {"type":"hslider","label":"Freq","address":"/dup/Freq","min":20,"max":2000,"init":440,"step":1}
        ]}
    ]}]}"#;
    let mut rig = Rig::new(BuilderConfig::default());
    let report = rig.build(json).unwrap();
    assert_eq!(report.parameters, 1);
    assert_eq!(rig.names(), vec!["Freq"]);
    assert_eq!(rig.renames.len(), 1);

    // both positions show a widget bound to the same parameter
    let bound: Vec<_> = rig
        .tree
        .outline()
        .into_iter()
        .filter(|l| l.contains("[SliderHorizontal]"))
        .collect();
    assert_eq!(bound.len(), 2);
}

#[test]
fn rename_rows_follow_creation_order() {
    let mut rig = Rig::new(BuilderConfig::default());
    rig.build(SYNTH).unwrap();
    let order: Vec<_> = rig.renames.rows.iter().map(|r| r.parameter.as_str()).collect();
    assert_eq!(order, vec!["Gain", "Cutoff", "Gain1", "Wave", "P3dbboost"]);
}

// =============================================================================
// Parameter kinds
// =============================================================================

#[test]
fn parameter_kinds_follow_widget_types() {
    let mut rig = Rig::new(BuilderConfig::default());
    rig.build(SYNTH).unwrap();

    let ParKind::Float(cutoff) = &rig.params.get("Cutoff").unwrap().kind else {
        panic!("expected float");
    };
    assert_eq!((cutoff.min, cutoff.max, cutoff.default), (20.0, 20000.0, 1000.0));
    assert!(cutoff.clamp_min && cutoff.clamp_max);
    assert_eq!(
        rig.params.get("Cutoff").unwrap().help.as_deref(),
        Some("Cutoff frequency")
    );

    let wave = rig.params.get("Wave").unwrap();
    let names: Vec<_> = wave.menu_items().unwrap().iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Noise", "Sawtooth", "Triangle"]);

    assert_eq!(rig.params.get("P3dbboost").unwrap().kind, ParKind::Pulse);
    assert!(rig.params.get("Level").is_none(), "bar graphs have no parameter");
}

#[test]
fn range_menu_without_style() {
    let json = r#"{"ui":[{"type":"nentry","label":"Mode","address":"/Mode","min":0,"max":2,"step":1,"init":0}]}"#;
    let mut rig = Rig::new(BuilderConfig::default());
    rig.build(json).unwrap();
    let items = rig.params.get("Mode").unwrap().menu_items().unwrap().to_vec();
    let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
    let labels: Vec<_> = items.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(names, vec!["0", "1", "2"]);
    assert_eq!(labels, vec!["0", "1", "2"]);
}

// =============================================================================
// Polyphony
// =============================================================================

const POLY: &str = r#"{"ui":[{"type":"tgroup","label":"Polyphonic","items":[
    {"type":"vgroup","label":"Voices","items":[
        {"type":"hslider","label":"Freq","address":"/Polyphonic/Voices/Freq","min":20,"max":2000,"init":440,"step":1},
        {"type":"hslider","label":"Cutoff","address":"/Polyphonic/Voices/Cutoff","min":20,"max":2000,"init":440,"step":1}
    ]},
    {"type":"vgroup","label":"Voice1","items":[
        {"type":"hslider","label":"Freq","address":"/Polyphonic/Voice1/Freq","min":20,"max":2000,"init":440,"step":1},
        {"type":"button","label":"Panic","address":"/Polyphonic/Voice1/Panic"}
    ]}
]}]}"#;

#[test]
fn ungrouped_voices_expose_template_voice_only() {
    let mut rig = Rig::new(polyphonic(false));
    let report = rig.build(POLY).unwrap();
    assert_eq!(rig.names(), vec!["Cutoff", "Freq"]);
    assert_eq!(
        rig.renames.address_of("Freq"),
        Some("/Polyphonic/Voice1/Freq")
    );
    assert_eq!(report.skipped, 2, "duplicate Freq and Panic");
}

#[test]
fn without_polyphony_every_voice_is_exposed() {
    let mut rig = Rig::new(BuilderConfig::default());
    rig.build(POLY).unwrap();
    assert_eq!(rig.names(), vec!["Freq", "Cutoff", "Freq1"]);
    assert_eq!(rig.renames.address_of("Freq"), Some("/Polyphonic/Voices/Freq"));
    assert_eq!(rig.renames.address_of("Freq1"), Some("/Polyphonic/Voice1/Freq"));
}

#[test]
fn grouped_voices_hide_midi_controls() {
    let json = r#"{"ui":[{"type":"vgroup","label":"organ","items":[
        {"type":"hslider","label":"freq","address":"/organ/freq","min":20,"max":2000,"init":440,"step":1},
        {"type":"hslider","label":"gain","address":"/organ/gain","min":0,"max":1,"init":0.5,"step":0.01},
        {"type":"button","label":"gate","address":"/organ/gate"},
        {"type":"hslider","label":"Release","address":"/organ/Release","min":0,"max":4,"init":1,"step":0.01}
    ]}]}"#;
    let mut rig = Rig::new(polyphonic(true));
    rig.build(json).unwrap();
    assert_eq!(rig.names(), vec!["Release"]);

    let mut mono = Rig::new(BuilderConfig::default());
    mono.build(json).unwrap();
    assert_eq!(mono.names().len(), 4);
}

#[test]
fn sequencer_tabs_get_fixed_labels() {
    let json = r#"{"ui":[{"type":"tgroup","label":"Sequencer","items":[
        {"type":"vgroup","label":"DSP1","items":[
            {"type":"hslider","label":"Cutoff","address":"/Sequencer/DSP1/Cutoff","min":0,"max":1,"init":0,"step":0.1}]},
        {"type":"vgroup","label":"DSP2","items":[
            {"type":"hslider","label":"Mix","address":"/Sequencer/DSP2/Mix","min":0,"max":1,"init":0,"step":0.1}]}
    ]}]}"#;

    let mut rig = Rig::new(polyphonic(true));
    rig.build(json).unwrap();
    let selector = rig.tree.find("Sequencer/tabs").unwrap();
    assert_eq!(
        rig.tree.node(selector).unwrap().property("Menulabels"),
        Some("'Instrument' 'Effect'")
    );

    let mut mono = Rig::new(BuilderConfig::default());
    mono.build(json).unwrap();
    let selector = mono.tree.find("Sequencer/tabs").unwrap();
    assert_eq!(
        mono.tree.node(selector).unwrap().property("Menulabels"),
        Some("'DSP1' 'DSP2'")
    );
}

// =============================================================================
// Panel layout
// =============================================================================

#[test]
fn filtered_out_group_creates_no_containers() {
    let json = r#"{"ui":[{"type":"vgroup","label":"synth","items":[
        {"type":"hgroup","label":"midi","items":[
            {"type":"button","label":"gate","address":"/synth/midi/gate"},
            {"type":"hslider","label":"freq","address":"/synth/midi/freq","min":20,"max":2000,"init":440,"step":1}
        ]}
    ]}]}"#;
    let mut rig = Rig::new(polyphonic(true));
    let report = rig.build(json).unwrap();
    assert_eq!(report.parameters, 0);
    assert!(rig.tree.is_empty(), "left: {:?}", rig.tree.outline());
}

#[test]
fn panel_bindings() {
    let mut rig = Rig::new(BuilderConfig {
        operator_path: "/project1/synth".into(),
        ..BuilderConfig::default()
    });
    rig.build(SYNTH).unwrap();

    let cutoff = rig.tree.find("synth1/Filter__LP_/Filter__LP_1/Cutoff").unwrap();
    let node = rig.tree.node(cutoff).unwrap();
    assert_eq!(rig.tree.template(cutoff), Some(faust_td::host::WidgetTemplate::Knob));
    assert_eq!(node.bindings[0].expression(), "op(\"/project1/synth\").par.Cutoff");

    let level = rig.tree.find("synth1/level/level").unwrap();
    let expr = rig.tree.node(level).unwrap().bindings[0].expression().to_string();
    assert!(expr.starts_with("tdu.remap(op(\"/project1/synth\").op(\"info1\")"));
    assert!(expr.ends_with("-60, 0, 0, 1)"));
}

#[test]
fn parameters_only_build_matches_full_build() {
    let mut full = Rig::new(BuilderConfig::default());
    full.build(SYNTH).unwrap();

    let mut params = ParameterSet::new();
    let mut renames = RenameTable::new();
    let mut builder = UiBuilder::new(BuilderConfig::default());
    builder
        .build_ui::<_, WidgetTree, _>(SYNTH, &mut params, None, &mut renames)
        .unwrap();

    assert_eq!(params, full.params);
    assert_eq!(renames, full.renames);
}

#[test]
fn root_is_reset_between_builds() {
    let mut rig = Rig::new(BuilderConfig::default());
    rig.build(SYNTH).unwrap();
    let root = rig.tree.root();
    assert_eq!(rig.tree.children(root).len(), 2, "header and group container");
}

#[test]
fn tab_pages_renumber_around_filtered_page() {
    let json = r#"{"ui":[{"type":"tgroup","label":"pages","items":[
        {"type":"vgroup","label":"A","items":[
            {"type":"button","label":"a","address":"/pages/A/a"}]},
        {"type":"vgroup","label":"B","items":[
            {"type":"button","label":"Panic","address":"/pages/B/Panic"}]},
        {"type":"vgroup","label":"C","items":[
            {"type":"button","label":"c","address":"/pages/C/c"}]}
    ]}]}"#;
    let mut rig = Rig::new(BuilderConfig::default());
    rig.build(json).unwrap();

    let selector = rig.tree.find("pages1/tabs").unwrap();
    assert_eq!(
        rig.tree.node(selector).unwrap().property("Menulabels"),
        Some("'A' 'C'")
    );
    assert!(rig.tree.find("pages1/B").is_none());

    let page = |name: &str| {
        let id = rig.tree.find(&format!("pages1/{name}")).unwrap();
        rig.tree.node(id).unwrap().bindings[0].expression().to_string()
    };
    assert_eq!(page("A"), "op(\"../tabs\").par.Value0 == 0");
    assert_eq!(page("C"), "op(\"../tabs\").par.Value0 == 1");
}

// =============================================================================
// Hostile input
// =============================================================================

#[test]
fn name_clash_with_other_page_is_suffixed() {
    let mut rig = Rig::new(BuilderConfig::default());
    rig.params.add_page("Settings");
    rig.params
        .append_parameter(
            "Settings",
            &faust_td::parameter::Parameter {
                name: "Polyphony".into(),
                label: "Polyphony".into(),
                help: None,
                kind: ParKind::Toggle { default: false },
            },
        )
        .unwrap();

    let json = r#"{"ui":[{"type":"button","label":"polyphony","address":"/polyphony"}]}"#;
    rig.build(json).unwrap();
    rig.build(json).unwrap();
    assert_eq!(rig.names(), vec!["Polyphony", "Polyphony1"]);
    assert_eq!(rig.renames.address_of("Polyphony1"), Some("/polyphony"));
}

#[test]
fn tiny_menu_step_is_truncated() {
    let json = r#"{"ui":[{"type":"nentry","label":"Mode","address":"/Mode",
        "min":0,"max":1,"step":1e-300,"init":0}]}"#;
    let mut rig = Rig::new(BuilderConfig::default());
    rig.build(json).unwrap();
    let items = rig.params.get("Mode").unwrap().menu_items().unwrap().len();
    assert_eq!(items, faust_td::parameter::MAX_MENU_ITEMS);
}

#[test]
fn non_finite_facet_is_rejected() {
    let json = r#"{"ui":[{"type":"nentry","label":"Mode","address":"/Mode",
        "min":0,"max":"inf","step":1,"init":0}]}"#;
    let mut rig = Rig::new(BuilderConfig::default());
    let err = rig.build(json).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ParseError);
    assert!(rig.params.is_empty());
}
