//! Vertex layouts and WGSL for drawing a [`Scene`](crate::Scene) and a
//! [`GridTrail`].
//!
//! The presentation layer uploads [`LineVertex`]/[`PointVertex`] arrays
//! as-is and draws them with [`SCENE_WGSL`]. Lines use `LineList`
//! topology; points use `PointList`. Grid cells are `TriangleList` quads
//! from [`grid_vertices`], drawn with [`GRID_WGSL`].

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

use crate::backdrop::{Scene, SceneSpace};
use crate::grid::{GridTrail, PatternKind};

/// Default color of points and links (`#6366f1`).
pub const SCENE_COLOR: Vec3 = Vec3::new(99.0 / 255.0, 102.0 / 255.0, 241.0 / 255.0);

/// Camera placement for world-space scenes.
pub const CAMERA_DISTANCE: f32 = 12.0;
pub const CAMERA_FOV_DEGREES: f32 = 60.0;

/// Vertex of a link segment.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub alpha: f32,
}

impl LineVertex {
    pub fn new(position: Vec3, alpha: f32) -> Self {
        Self {
            position: position.to_array(),
            alpha,
        }
    }
}

/// Vertex of a particle point.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PointVertex {
    pub position: [f32; 3],
    pub alpha: f32,
}

impl PointVertex {
    pub fn new(position: Vec3, alpha: f32) -> Self {
        Self {
            position: position.to_array(),
            alpha,
        }
    }
}

/// Uniforms consumed by [`SCENE_WGSL`].
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub color: [f32; 3],
    pub rotation_y: f32,
}

impl SceneUniforms {
    /// Camera looking down -Z from `distance` with the given vertical FOV.
    pub fn new(aspect: f32, distance: f32, fov_degrees: f32, color: Vec3, rotation_y: f32) -> Self {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, distance), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(fov_degrees.to_radians(), aspect, 0.1, 100.0);
        Self {
            view_proj: (proj * view).to_cols_array_2d(),
            color: color.to_array(),
            rotation_y,
        }
    }

    /// Uniforms for drawing `scene` into a viewport of the given aspect ratio.
    pub fn for_scene(scene: &Scene, aspect: f32, color: Vec3) -> Self {
        match scene.space {
            SceneSpace::World => Self::new(
                aspect,
                CAMERA_DISTANCE,
                CAMERA_FOV_DEGREES,
                color,
                scene.rotation_y,
            ),
            SceneSpace::Screen => Self {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                color: color.to_array(),
                rotation_y: scene.rotation_y,
            },
        }
    }
}

/// Shared line/point shader. Vertex buffer slot 0 holds `vec3 position, f32 alpha`.
pub const SCENE_WGSL: &str = r#"
struct SceneUniforms {
    view_proj: mat4x4<f32>,
    color: vec3<f32>,
    rotation_y: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: SceneUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) alpha: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) alpha: f32,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let c = cos(uniforms.rotation_y);
    let s = sin(uniforms.rotation_y);
    let rotated = vec3<f32>(
        in.position.x * c + in.position.z * s,
        in.position.y,
        -in.position.x * s + in.position.z * c,
    );

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(rotated, 1.0);
    out.alpha = in.alpha;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(uniforms.color, in.alpha);
}
"#;

/// Corner of a grid cell quad, already in clip space.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GridVertex {
    pub position: [f32; 2],
    /// Position inside the cell, `0..1` on both axes.
    pub uv: [f32; 2],
    pub color: [f32; 4],
    pub pattern_alpha: f32,
    /// 0 for no pattern, else [`pattern_code`].
    pub pattern: u32,
}

/// Pattern id understood by [`GRID_WGSL`].
pub fn pattern_code(kind: PatternKind) -> u32 {
    match kind {
        PatternKind::DiagonalLines => 1,
        PatternKind::Dots => 2,
        PatternKind::Grid => 3,
        PatternKind::CrossHatch => 4,
    }
}

/// Six vertices per cell of `grid`, for a window of `viewport` pixels.
///
/// Trail cells are filled with the trail color, idle cells with white.
pub fn grid_vertices(grid: &GridTrail, viewport: Vec2) -> Vec<GridVertex> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return Vec::new();
    }

    let config = grid.config();
    let region = grid.region();
    let cell = Vec2::new(region.width / config.cols as f32, region.height / config.rows as f32);
    let to_clip = |px: Vec2| [px.x / viewport.x * 2.0 - 1.0, 1.0 - px.y / viewport.y * 2.0];
    let [r, g, b] = config.trail_color.map(|c| c as f32 / 255.0);

    let cells = grid.cells();
    let mut vertices = Vec::with_capacity(cells.len() * 6);
    for style in cells {
        let color = if style.is_active() {
            [r, g, b, style.fill_alpha]
        } else {
            [1.0, 1.0, 1.0, style.fill_alpha]
        };
        let (pattern, pattern_alpha) = style
            .pattern
            .map(|(kind, alpha)| (pattern_code(kind), alpha))
            .unwrap_or((0, 0.0));

        let origin = Vec2::new(region.left, region.top) + cell * Vec2::new(style.col as f32, style.row as f32);
        let corner = |u: f32, v: f32| GridVertex {
            position: to_clip(origin + cell * Vec2::new(u, v)),
            uv: [u, v],
            color,
            pattern_alpha,
            pattern,
        };
        vertices.extend_from_slice(&[
            corner(0.0, 0.0),
            corner(1.0, 0.0),
            corner(1.0, 1.0),
            corner(0.0, 0.0),
            corner(1.0, 1.0),
            corner(0.0, 1.0),
        ]);
    }
    vertices
}

/// Grid cell shader: flat fill plus a procedural pattern overlay.
pub const GRID_WGSL: &str = r#"
struct GridInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) color: vec4<f32>,
    @location(3) pattern_alpha: f32,
    @location(4) pattern: u32,
};

struct GridOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec4<f32>,
    @location(2) pattern_alpha: f32,
    @location(3) @interpolate(flat) pattern: u32,
};

@vertex
fn vs_main(in: GridInput) -> GridOutput {
    var out: GridOutput;
    out.clip_position = vec4<f32>(in.position, 0.0, 1.0);
    out.uv = in.uv;
    out.color = in.color;
    out.pattern_alpha = in.pattern_alpha;
    out.pattern = in.pattern;
    return out;
}

fn pattern_mask(kind: u32, uv: vec2<f32>) -> f32 {
    let tile = fract(uv * 4.0);
    let diagonal = fract((uv.x + uv.y) * 4.0);
    let anti = fract((uv.x - uv.y) * 4.0);
    var mask = 0.0;
    switch kind {
        case 1u: {
            mask = select(0.0, 1.0, diagonal < 0.2);
        }
        case 2u: {
            let d = min(distance(uv, vec2<f32>(0.25, 0.25)), distance(uv, vec2<f32>(0.75, 0.75)));
            mask = select(0.0, 1.0, d < 0.08);
        }
        case 3u: {
            mask = select(0.0, 1.0, any(tile < vec2<f32>(0.1, 0.1)));
        }
        case 4u: {
            mask = select(0.0, 1.0, diagonal < 0.15 || anti < 0.15);
        }
        default: {}
    }
    return mask;
}

@fragment
fn fs_main(in: GridOutput) -> @location(0) vec4<f32> {
    let stroke = pattern_mask(in.pattern, in.uv) * in.pattern_alpha;
    return vec4<f32>(in.color.rgb, max(in.color.a, stroke));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<LineVertex>(), 16);
        assert_eq!(std::mem::size_of::<PointVertex>(), 16);
        // mat4 + vec3 + f32 packs into 80 bytes, a multiple of 16
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 80);
    }

    #[test]
    fn test_vertex_bytes() {
        let verts = [LineVertex::new(Vec3::new(1.0, 2.0, 3.0), 0.25)];
        let bytes: &[u8] = bytemuck::cast_slice(&verts);
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[12..16], &0.25f32.to_ne_bytes());
    }

    fn running_grid() -> GridTrail {
        use crate::backdrop::Lifecycle;
        use crate::grid::{GridConfig, Region};

        let config = GridConfig {
            rows: 2,
            cols: 2,
            ..Default::default()
        };
        let mut grid = GridTrail::new(config, Region::new(100.0, 0.0, 200.0, 100.0)).unwrap();
        grid.start();
        grid
    }

    #[test]
    fn test_grid_vertex_layout() {
        assert_eq!(std::mem::size_of::<GridVertex>(), 40);
    }

    #[test]
    fn test_grid_quads_cover_region() {
        let mut grid = running_grid();
        grid.on_pointer_move(250.0, 75.0); // cell 3

        let vertices = grid_vertices(&grid, Vec2::new(400.0, 100.0));
        assert_eq!(vertices.len(), 4 * 6);

        // cell 0 spans x 100..200, y 0..50 of a 400x100 window
        let first = &vertices[0..6];
        assert_eq!(first[0].position, [-0.5, 1.0]);
        assert_eq!(first[2].position, [0.0, 0.0]);
        assert_eq!(first[0].color, [1.0, 1.0, 1.0, crate::grid::IDLE_ALPHA]);
        assert_eq!(first[0].pattern, 0);

        let active = &vertices[18..24];
        let [r, g, b] = [158.0 / 255.0, 231.0 / 255.0, 102.0 / 255.0];
        assert_eq!(active[0].color, [r, g, b, 0.1 + 0.3]);
        assert_eq!(active[0].pattern, pattern_code(PatternKind::Grid));
        assert!(active[0].pattern_alpha > 0.0);
        assert_eq!(active[2].position, [0.5, -1.0]);
        assert_eq!(active[5].uv, [0.0, 1.0]);
    }

    #[test]
    fn test_grid_vertices_empty_viewport() {
        assert!(grid_vertices(&running_grid(), Vec2::ZERO).is_empty());
    }

    #[test]
    fn test_screen_scene_uses_identity() {
        let scene = Scene {
            space: SceneSpace::Screen,
            ..Default::default()
        };
        let uniforms = SceneUniforms::for_scene(&scene, 2.0, SCENE_COLOR);
        assert_eq!(uniforms.view_proj, Mat4::IDENTITY.to_cols_array_2d());

        let world = SceneUniforms::for_scene(&Scene::default(), 2.0, SCENE_COLOR);
        assert_ne!(world.view_proj, Mat4::IDENTITY.to_cols_array_2d());
    }
}
