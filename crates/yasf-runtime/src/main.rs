// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! `yasf-inspect`: builds a YASF scene from disk and prints its render tree.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use yasf_core::math::Vec3;
use yasf_scene::lod::Lod;
use yasf_scene::node::{RenderNode, SceneObject};
use yasf_scene::texture_loader::TextureLoader;
use yasf_scene::{Scene, SceneAssembler, SceneConfig, SceneDocument};

#[derive(Parser, Debug)]
#[command(name = "yasf-inspect", version, about = "Build a YASF scene and print its graph")]
struct Args {
    /// Scene document to load.
    scene: PathBuf,

    /// Optional build configuration (JSON).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Camera position used to select LOD levels, as `x,y,z`.
    #[arg(long, value_parser = parse_vec3)]
    camera: Option<Vec3>,

    /// Print the statistics as JSON instead of the tree.
    #[arg(long)]
    json: bool,

    /// Do not load textures.
    #[arg(long)]
    no_textures: bool,

    /// Write every mesh's vertex and index buffers into this directory.
    #[arg(long, value_name = "DIR")]
    export_buffers: Option<PathBuf>,
}

fn parse_vec3(value: &str) -> Result<Vec3, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f32>().map_err(|err| format!("'{part}': {err}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected three comma-separated numbers, got '{value}'")),
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SceneConfig::from_file(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => {
            let mut config = SceneConfig::default();
            // Resolve textures next to the scene file unless told otherwise.
            config.asset_root = args.scene.parent().map(PathBuf::from);
            config
        }
    };
    let document = SceneDocument::from_file(&args.scene)
        .with_context(|| format!("Failed to read scene '{}'", args.scene.display()))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;
    let loader = (!args.no_textures).then(|| TextureLoader::from_files(runtime.handle().clone()));

    let mut assembler = SceneAssembler::new(&config);
    if let Some(loader) = &loader {
        assembler = assembler.with_loader(loader);
    }
    let Scene {
        globals,
        cameras,
        mut graph,
        pending,
    } = assembler
        .assemble(&document)
        .context("Failed to build the scene graph")?;

    let results = runtime.block_on(pending.wait_all());
    let failed = results.iter().filter(|r| r.is_err()).count();
    log::info!("{} texture loads finished, {failed} failed", results.len());

    let camera = args
        .camera
        .or_else(|| cameras.initial().map(|c| c.location));
    if let Some(position) = camera {
        graph.update_lods(position);
    }

    if let Some(dir) = &args.export_buffers {
        let written = export_buffers(graph.root(), dir)?;
        log::info!("Exported {written} mesh buffers to '{}'", dir.display());
    }

    let stats = graph.stats();
    if args.json {
        let report = serde_json::json!({
            "nodes": stats.nodes,
            "meshes": stats.meshes,
            "lights": stats.lights,
            "lods": stats.lods,
            "triangles": stats.triangles,
            "cameras": cameras.len(),
            "texture_failures": failed,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if let Some(background) = globals.background {
        println!(
            "background: ({:.2}, {:.2}, {:.2})",
            background.r, background.g, background.b
        );
    }
    for camera in cameras.iter() {
        println!("camera '{}': {:?}", camera.id, camera.projection);
    }
    print_node(graph.root(), 0);
    println!("{stats}");
    Ok(())
}

/// Writes `<n>_<mesh>.vertices.bin` (and `.indices.bin` when indexed) for
/// every mesh in the tree, LOD levels included. Returns the number of meshes.
fn export_buffers(root: &RenderNode, dir: &Path) -> Result<usize> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create '{}'", dir.display()))?;
    let mut written = 0;
    export_node(root, dir, &mut written)?;
    Ok(written)
}

fn export_node(node: &RenderNode, dir: &Path, written: &mut usize) -> Result<()> {
    for child in &node.children {
        match child {
            SceneObject::Node(child) => export_node(child, dir, written)?,
            SceneObject::Lod(lod) => {
                for level in lod.levels() {
                    if let Some(level_node) = &level.object {
                        export_node(level_node, dir, written)?;
                    }
                }
            }
            SceneObject::Mesh(mesh) => {
                let stem = format!("{:03}_{}", *written, file_stem(&mesh.name));
                let vertices = dir.join(format!("{stem}.vertices.bin"));
                fs::write(&vertices, mesh.mesh.create_vertex_buffer())
                    .with_context(|| format!("Failed to write '{}'", vertices.display()))?;
                if let Some(bytes) = mesh.mesh.index_bytes() {
                    let indices = dir.join(format!("{stem}.indices.bin"));
                    fs::write(&indices, bytes)
                        .with_context(|| format!("Failed to write '{}'", indices.display()))?;
                }
                *written += 1;
            }
            SceneObject::Light(_) => {}
        }
    }
    Ok(())
}

fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn print_node(node: &RenderNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let t = &node.transform;
    println!(
        "{indent}{} [material: {}, shadows: {}/{}, translate: ({}, {}, {})]",
        node.name,
        node.material_ref.as_deref().unwrap_or("-"),
        node.cast_shadow,
        node.receive_shadow,
        t.translation.x,
        t.translation.y,
        t.translation.z,
    );
    for child in &node.children {
        match child {
            SceneObject::Node(child) => print_node(child, depth + 1),
            SceneObject::Lod(lod) => print_lod(lod, depth + 1),
            SceneObject::Mesh(mesh) => println!(
                "{indent}  mesh {} ({} triangles)",
                mesh.name,
                mesh.mesh.triangle_count()
            ),
            SceneObject::Light(light) => {
                println!("{indent}  {} light {}", light.light.kind_name(), light.name)
            }
        }
    }
}

fn print_lod(lod: &Lod, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{indent}lod {} (active level {})", lod.name, lod.active_index());
    for level in lod.levels() {
        match &level.object {
            Some(node) => {
                println!("{indent}  >= {}:", level.min_distance);
                print_node(node, depth + 2);
            }
            None => println!("{indent}  >= {}: (empty)", level.min_distance),
        }
    }
}
