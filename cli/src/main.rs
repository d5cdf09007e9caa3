use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use normal_oxide::decode::{self, Format};
use normal_oxide::prelude::*;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "normal-oxide")]
#[command(about = "Inspect 3-manifold triangulations and the normal surfaces inside them")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarise a triangulation given by any supported signature
    Info { sig: String },
    /// Build the layered lens space L(p, q)
    Lens { p: u64, q: u64 },
    /// Rehydrate a census dehydration string
    Dehydrate { string: String },
    /// Decode a splitting surface signature
    Signature { sig: String },
    /// Print the tight encoding of a permutation of up to five elements
    Perm { images: Vec<usize> },
    /// Cut a triangulation open along a vertex link
    Cut {
        sig: String,
        #[arg(long)]
        vertex_link: usize,
    },
    /// Crush a vertex link in a triangulation
    Crush {
        sig: String,
        #[arg(long)]
        vertex_link: usize,
    },
}

#[derive(Serialize)]
struct Summary {
    size: usize,
    vertices: usize,
    edges: usize,
    triangles: usize,
    components: usize,
    boundary_euler_chars: Vec<i64>,
    valid: bool,
    closed: bool,
    orientable: bool,
    ideal: bool,
    euler_char: i64,
    homology: String,
    iso_sig: String,
}

impl Summary {
    fn new(tri: &Triangulation3) -> Self {
        Self {
            size: tri.size(),
            vertices: tri.count_vertices(),
            edges: tri.count_edges(),
            triangles: tri.count_triangles(),
            components: tri.count_components(),
            boundary_euler_chars: tri.boundary_components().iter().map(|b| b.euler_char()).collect(),
            valid: tri.is_valid(),
            closed: tri.is_closed(),
            orientable: tri.is_orientable(),
            ideal: tri.is_ideal(),
            euler_char: tri.euler_char_manifold(),
            homology: tri.homology_h1().to_string(),
            iso_sig: tri.iso_sig(),
        }
    }

    fn print(&self, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
            return Ok(());
        }
        println!("tetrahedra:  {}", self.size);
        println!("f-vector:    {} {} {} {}", self.vertices, self.edges, self.triangles, self.size);
        println!("components:  {}", self.components);
        println!("boundary:    {:?}", self.boundary_euler_chars);
        println!("valid:       {}", self.valid);
        println!("closed:      {}", self.closed);
        println!("orientable:  {}", self.orientable);
        println!("ideal:       {}", self.ideal);
        println!("euler char:  {}", self.euler_char);
        println!("H1:          {}", self.homology);
        println!("isosig:      {}", self.iso_sig);
        Ok(())
    }
}

fn vertex_link(sig: &str, vertex: usize) -> Result<NormalSurface> {
    let tri = Arc::new(decode_any(sig)?);
    if vertex >= tri.count_vertices() {
        anyhow::bail!("Vertex {vertex} does not exist; the triangulation has {} vertices", tri.count_vertices());
    }
    Ok(NormalSurface::vertex_link(tri, FaceIdx::from(vertex))?)
}

fn tight_perm(images: &[usize]) -> Result<String> {
    fn encode<const N: usize>(images: &[usize]) -> Result<String> {
        let images: [usize; N] = images.try_into()?;
        Ok(Perm::<N>::from_images(images)?.tight_encoding())
    }
    match images.len() {
        2 => encode::<2>(images),
        3 => encode::<3>(images),
        4 => encode::<4>(images),
        5 => encode::<5>(images),
        n => anyhow::bail!("Permutations of {n} elements are not supported"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let tri = match cli.command {
        Command::Info { sig } => decode_any(&sig)?,
        Command::Lens { p, q } => factory::layered_lens_space(p, q)?,
        Command::Dehydrate { string } => decode::decode(&string, Format::Dehydration)?,
        Command::Signature { sig } => decode::decode(&sig, Format::SplittingSignature)?,
        Command::Perm { images } => {
            let encoding = tight_perm(&images)?;
            if cli.json {
                println!("{}", serde_json::json!({ "images": images, "tight": encoding }));
            } else {
                println!("{encoding}");
            }
            return Ok(());
        }
        Command::Cut { sig, vertex_link: v } => vertex_link(&sig, v)?.cut_along()?,
        Command::Crush { sig, vertex_link: v } => vertex_link(&sig, v)?.crush()?,
    };

    Summary::new(&tri).print(cli.json)
}
