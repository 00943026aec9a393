#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;

pub fn maze_project() -> Value {
    json!({
        "objName": "Stage",
        "variables": [{ "name": "score", "value": 0, "isPersistent": false }],
        "scripts": [[10, 10, [["whenGreenFlagClicked"], ["setVar:to:", "score", 0]]]],
        "costumes": [{ "costumeName": "backdrop1", "baseLayerID": 3 }],
        "children": [
            {
                "objName": "Cat",
                "scripts": [
                    [20, 30, [
                        ["whenKeyPressed", "space"],
                        ["doIf", ["=", ["answer"], "yes"], [["say:", "[ok]"]]]
                    ]],
                    [200, 40, [
                        ["whenClicked"],
                        ["doForever", [["turnRight:", 15], ["forward:", ["*", 2, ["xpos"]]]]]
                    ]]
                ],
                "scratchX": 0
            },
            { "target": "Cat", "cmd": "getVar:", "param": "score" },
            { "objName": "Dog", "scripts": [] }
        ],
        "info": { "projectID": "42" }
    })
}

pub const MAZE_RENDERED: &str = "\
  Stage
    whenGreenFlagClicked
    setVar:to:
    Cat
      whenKeyPressed
      doIf
        =
        answer
        say:
      whenClicked
      doForever
        turnRight:
        forward:
          *
          xpos
    Dog
";

pub fn green_flag_project() -> Value {
    json!({
        "objName": "Stage",
        "scripts": [[["whenGreenFlagClicked"]]],
        "children": []
    })
}

/// Writes a minimal `.sb2`: the pretty-printed project plus one asset.
pub fn write_sb2(path: &Path, project: &Value) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let opts = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    zip.start_file("project.json", opts).unwrap();
    zip.write_all(serde_json::to_string_pretty(project).unwrap().as_bytes())
        .unwrap();
    zip.start_file("0.png", opts).unwrap();
    zip.write_all(b"\x89PNG\r\n").unwrap();
    zip.finish().unwrap();
}
