/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Matrix4;
use std::io::Write;
use xscene_core::{Camera, Mesh, ScreenPoint, Triangle};

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Lowest ramp index used for lit geometry, so faces never vanish into the background
const MIN_SHADE: usize = 1;

/// ASCII renderer that converts 3D meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
    }

    /// Character at a cell, mainly for inspection in tests
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    pub fn render_mesh(&mut self, mesh: &Mesh, model_matrix: &Matrix4<f32>, camera: &Camera) {
        let light_dir = (camera.position - camera.target)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(nalgebra::Vector3::z);

        for triangle in &mesh.triangles {
            self.render_triangle(triangle, model_matrix, camera, &light_dir);
        }
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        model_matrix: &Matrix4<f32>,
        camera: &Camera,
        light_dir: &nalgebra::Vector3<f32>,
    ) {
        let mut corners = [ScreenPoint { x: 0.0, y: 0.0, depth: 0.0 }; 3];
        for (corner, vertex) in corners.iter_mut().zip(&triangle.vertices) {
            match camera.project_to_screen(
                &vertex.position,
                model_matrix,
                self.width as u32,
                self.height as u32,
            ) {
                Some(point) => *corner = point,
                None => return, // Triangle is clipped
            }
        }

        let normal = model_matrix
            .transform_vector(&triangle.face_normal())
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(nalgebra::Vector3::zeros);
        let brightness = normal.dot(light_dir).max(0.0);

        let top = LUMINOSITY_RAMP.len() - 1;
        let index = MIN_SHADE + (brightness * (top - MIN_SHADE) as f32).round() as usize;
        self.rasterize_triangle(&corners, LUMINOSITY_RAMP[index.min(top)]);
    }

    fn rasterize_triangle(&mut self, corners: &[ScreenPoint; 3], character: char) {
        let [v0, v1, v2] = *corners;

        let min_x = (v0.x.min(v1.x).min(v2.x).floor() as i32).max(0);
        let max_x = (v0.x.max(v1.x).max(v2.x).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (v0.y.min(v1.y).min(v2.y).floor() as i32).max(0);
        let max_y = (v0.y.max(v1.y).max(v2.y).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let pixel = (x as f32 + 0.5, y as f32 + 0.5);
                let Some((w0, w1, w2)) = barycentric(&v0, &v1, &v2, pixel) else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.char_buffer[idx] = character;
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for row in self.char_buffer.chunks(self.width.max(1)) {
            for &c in row {
                let color = match c {
                    ' ' | '.' | ':' => Color::DarkGrey,
                    '-' | '=' => Color::Grey,
                    '+' | '*' => Color::White,
                    '#' | '%' | '@' => Color::Cyan,
                    _ => Color::White,
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            writer.queue(Print("\r\n"))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Barycentric weights of `p` in the screen-space triangle
fn barycentric(
    v0: &ScreenPoint,
    v1: &ScreenPoint,
    v2: &ScreenPoint,
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.y - v2.y) * (v0.x - v2.x) + (v2.x - v1.x) * (v0.y - v2.y);
    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.y - v2.y) * (p.0 - v2.x) + (v2.x - v1.x) * (p.1 - v2.y)) / denom;
    let w1 = ((v2.y - v0.y) * (p.0 - v2.x) + (v0.x - v2.x) * (p.1 - v2.y)) / denom;
    Some((w0, w1, 1.0 - w0 - w1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};
    use xscene_core::Aabb;

    #[test]
    fn test_cube_covers_screen_centre() {
        let mesh = Mesh::cube(1.0);
        let bounds = Aabb::from_center_size(Point3::origin(), Vector3::new(1.0, 1.0, 1.0));
        let camera = Camera::framing(&bounds, 40, 20);
        let mut renderer = AsciiRenderer::new(40, 20);

        renderer.render_mesh(&mesh, &Matrix4::identity(), &camera);

        assert_ne!(renderer.cell(20, 10), Some(' '));
        assert_eq!(renderer.cell(0, 0), Some(' '));
        assert_eq!(renderer.cell(40, 0), None);
    }

    #[test]
    fn test_clear_resets_buffers() {
        let mesh = Mesh::cube(1.0);
        let camera = Camera::framing(
            &Aabb::from_center_size(Point3::origin(), Vector3::new(1.0, 1.0, 1.0)),
            10,
            10,
        );
        let mut renderer = AsciiRenderer::new(10, 10);
        renderer.render_mesh(&mesh, &Matrix4::identity(), &camera);
        renderer.clear();
        assert!((0..10).all(|y| (0..10).all(|x| renderer.cell(x, y) == Some(' '))));
    }

    #[test]
    fn test_draw_emits_one_line_per_row() {
        let renderer = AsciiRenderer::new(3, 2);
        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert_eq!(text.matches("\r\n").count(), 2);
    }

    #[test]
    fn test_barycentric_degenerate() {
        let p = ScreenPoint { x: 1.0, y: 1.0, depth: 0.0 };
        assert!(barycentric(&p, &p, &p, (1.0, 1.0)).is_none());
    }
}
