use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, bail, Context};
use glam::{Mat4, Vec3};
use rand::prelude::*;

use crate::geometry::Mesh;
use crate::scene::{
    Material, Renderable, Scene, SceneBuffers, Sphere, Transform, DIELECTRIC, EMISSIVE, LAMBERTIAN,
    METAL,
};

/// Command-line options of the demo binary.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub objs: Vec<PathBuf>,
    pub cube: Option<[u32; 3]>,
    pub plane: Option<[u32; 2]>,
    pub spheres: usize,
    pub seed: u64,
    pub out: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            objs: Vec::new(),
            cube: Some([1, 1, 1]),
            plane: Some([4, 4]),
            spheres: 16,
            seed: 42,
            out: None,
        }
    }
}

fn parse_dims<const N: usize>(flag: &str, value: &str) -> anyhow::Result<[u32; N]> {
    let parts = value
        .split('x')
        .map(|p| p.parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("{flag}: invalid segment count in {value:?}"))?;
    parts
        .try_into()
        .map_err(|_| anyhow!("{flag}: expected {N} segment counts separated by 'x', got {value:?}"))
}

impl Config {
    /// Parses `args` as produced by `std::env::args`; the first item is
    /// the program name.
    pub fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let mut config = Self::default();
        let mut args = args.into_iter().skip(1);
        while let Some(flag) = args.next() {
            let mut value = || args.next().ok_or_else(|| anyhow!("{flag} needs a value"));
            match flag.as_str() {
                "--obj" => config.objs.push(value()?.into()),
                "--cube" => config.cube = Some(parse_dims(&flag, &value()?)?),
                "--plane" => config.plane = Some(parse_dims(&flag, &value()?)?),
                "--no-cube" => config.cube = None,
                "--no-plane" => config.plane = None,
                "--spheres" => {
                    config.spheres = value()?.parse::<usize>().context("--spheres")?;
                }
                "--seed" => config.seed = value()?.parse::<u64>().context("--seed")?,
                "--out" => config.out = Some(value()?.into()),
                other => bail!("unknown argument {other:?}"),
            }
        }
        Ok(config)
    }
}

/// Builds the demo scene from a `Config`, packs it and optionally dumps
/// every region to `<out>/<region>.bin`.
#[derive(Debug, Default)]
pub struct App {
    config: Config,
    scene: Scene,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            scene: Scene::new(),
        }
    }

    pub fn parse_args(&mut self, args: impl IntoIterator<Item = String>) -> anyhow::Result<()> {
        self.config = Config::parse_args(args)?;
        Ok(())
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Populates the scene. Meshes are laid out along +X so they do not
    /// overlap the sphere cluster at the origin.
    pub fn init(&mut self) -> anyhow::Result<()> {
        let start = Instant::now();
        self.add_spheres()?;

        let mut slot = 0.0;
        let mut place = |scene: &mut Scene, mesh: Mesh| -> anyhow::Result<()> {
            slot += 3.0;
            let material = Material::new_lambertian(scene.ids().next(), Vec3::splat(0.7));
            let transform = Transform::new(scene.ids().next())
                .with_translation(Vec3::new(slot, 0.0, 0.0));
            let renderable_id = scene.ids().next();
            let renderable =
                Renderable::new(renderable_id, mesh.id(), material.id(), transform.id());
            scene.add_mesh(mesh)?;
            scene.add_material(material)?;
            scene.add_transform(transform)?;
            scene.add_renderable(renderable)?;
            Ok(())
        };

        if let Some([w, h, d]) = self.config.cube {
            let id = self.scene.ids().next();
            place(&mut self.scene, Mesh::cube(id, w, h, d))?;
        }
        if let Some([w, h]) = self.config.plane {
            let id = self.scene.ids().next();
            let floor = Mat4::from_rotation_x(std::f32::consts::FRAC_PI_2)
                * Mat4::from_scale(Vec3::splat(8.0));
            place(&mut self.scene, Mesh::plane(id, w, h).with_model(floor))?;
        }
        for path in &self.config.objs {
            let id = self.scene.ids().next();
            let mesh = Mesh::load_obj_file(id, path)
                .with_context(|| format!("loading {}", path.display()))?;
            place(&mut self.scene, mesh)?;
        }
        log::info!("scene built in {:?}", start.elapsed());
        Ok(())
    }

    /// Scatters spheres on a shell around a dark base sphere.
    fn add_spheres(&mut self) -> anyhow::Result<()> {
        if self.config.spheres == 0 {
            return Ok(());
        }
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let scene = &mut self.scene;
        let base_radius = 1.0;
        let base = Material::new_lambertian(scene.ids().next(), Vec3::new(0.06, 0.06, 0.1));
        scene.add_material(base)?;
        let id = scene.ids().next();
        scene.add_sphere(Sphere::new(id, Vec3::ZERO, base_radius, base.id()))?;

        for _ in 1..self.config.spheres {
            let dir = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            )
            .try_normalize()
            .unwrap_or(Vec3::Y);
            let size = rng.gen_range(0.05..0.15) * base_radius;
            let center = dir * (base_radius + size);
            let id = scene.ids().next();
            let material = match rng.gen_range(LAMBERTIAN..=EMISSIVE) {
                METAL => {
                    let color = Vec3::new(rng.gen(), rng.gen(), rng.gen());
                    Material::new_metal(id, color, rng.gen())
                }
                DIELECTRIC => Material::new_dielectric(id, rng.gen_range(1.3..1.8)),
                EMISSIVE => Material::new_emissive(id, Vec3::ONE, rng.gen_range(1.0..4.0)),
                _ => {
                    let color = Vec3::new(rng.gen(), rng.gen(), rng.gen());
                    Material::new_lambertian(id, color)
                }
            };
            scene.add_material(material)?;
            let sphere_id = scene.ids().next();
            scene.add_sphere(Sphere::new(sphere_id, center, size, material.id()))?;
        }
        Ok(())
    }

    pub fn pack(&mut self) -> &SceneBuffers {
        self.scene.pack()
    }

    /// Builds, packs and dumps the scene.
    pub fn run(&mut self) -> anyhow::Result<()> {
        self.init()?;
        let start = Instant::now();
        let out = self.config.out.clone();
        let buffers = self.scene.pack();
        log::info!("packed in {:?}", start.elapsed());
        for region in buffers.regions() {
            log::info!(
                "{:>14}: {:>6} records, {:>9} bytes",
                region.name,
                region.record_count(),
                region.bytes.len()
            );
        }
        if let Some(dir) = out {
            dump(buffers, &dir)?;
        }
        Ok(())
    }
}

fn dump(buffers: &SceneBuffers, dir: &std::path::Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    for region in buffers.regions() {
        let path = dir.join(format!("{}.bin", region.name));
        std::fs::write(&path, region.bytes)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    log::info!("wrote {} regions to {}", buffers.regions().len(), dir.display());
    Ok(())
}
