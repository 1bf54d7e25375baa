//! Map camera, layout and drawing systems

use bevy::camera::Viewport;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContext;

use crate::config::DashboardConfig;
use crate::geometry::{BoundingBox, Geometry, Position};
use crate::map::controller::MapViewportController;
use crate::map::surface::{MapSurface, MapViewport};
use crate::store::DashboardStore;
use crate::ui::state::UIState;

// #840032
const AOI_COLOR: Color = Color::srgb(0.518, 0.0, 0.196);
const TRACK_COLOR: Color = Color::srgb(1.0, 0.0, 0.0);
const FRAME_COLOR: Color = Color::srgba(0.55, 0.65, 0.75, 0.8);
const GRATICULE_COLOR: Color = Color::srgba(0.35, 0.42, 0.5, 0.35);
const GRATICULE_STEP_DEG: i32 = 30;
/// On-screen radius of point geometries.
const POINT_RADIUS_PX: f32 = 4.0;

/// The basemap covers the whole equirectangular plane, one unit per degree.
pub const BASEMAP_SIZE: Vec2 = Vec2::new(360.0, 180.0);
/// Kept behind the gizmo layers.
const BASEMAP_Z: f32 = -10.0;

const WORLD_BOUNDS: BoundingBox = BoundingBox {
    min_lat: -90.0,
    min_lon: -180.0,
    max_lat: 90.0,
    max_lon: 180.0,
};

#[derive(Component)]
pub struct MapCamera;

pub fn setup_map_camera(
    mut commands: Commands,
    mut viewport: ResMut<MapViewport>,
    mut controller: ResMut<MapViewportController>,
) {
    commands.spawn((
        Camera2d,
        Camera {
            clear_color: ClearColorConfig::Custom(Color::srgb(0.05, 0.07, 0.1)),
            ..default()
        },
        Projection::Orthographic(OrthographicProjection::default_2d()),
        MapCamera,
        Name::new("Map Camera"),
    ));
    // Whole world until there is something to fit; held until the first layout.
    viewport.fit_bounds(&WORLD_BOUNDS, 0.0);
    controller.on_mount(&mut *viewport);
}

pub fn setup_basemap(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Option<Res<DashboardConfig>>,
) {
    let path = match config {
        Some(config) => config.basemap_path.clone(),
        None => DashboardConfig::default().basemap_path,
    };
    let Some(path) = path else {
        info!("[MAP] basemap disabled");
        return;
    };
    info!("[MAP] basemap {}", path);
    commands.spawn(basemap(asset_server.load(path)));
}

fn basemap(image: Handle<Image>) -> (Sprite, Transform, Name) {
    (
        Sprite {
            image,
            custom_size: Some(BASEMAP_SIZE),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, BASEMAP_Z),
        Name::new("Basemap"),
    )
}

/// Window size and panel visibility. A change means the map container itself
/// was resized; a panel width change alone is left to the deferred re-layout.
type ContainerKey = (Vec2, bool);

/// Crop the map camera to the area right of the side panel and report its
/// size. The egui camera stays uncropped.
pub fn layout_map_viewport(
    window: Single<&Window, With<PrimaryWindow>>,
    ui_state: Res<UIState>,
    mut camera: Single<&mut Camera, (With<MapCamera>, Without<EguiContext>)>,
    mut viewport: ResMut<MapViewport>,
    mut controller: ResMut<MapViewportController>,
    mut container: Local<Option<ContainerKey>>,
) {
    let sidebar = if ui_state.show_sidebar {
        ui_state.sidebar_width_px.max(0.0)
    } else {
        0.0
    };
    let window_size = Vec2::new(window.width(), window.height());
    let logical = Vec2::new((window_size.x - sidebar).max(0.0), window_size.y.max(0.0));
    let remeasured = viewport.set_measured(logical);

    let key = (window_size, ui_state.show_sidebar);
    if *container != Some(key) {
        *container = Some(key);
        debug!("[MAP] container now {}x{}", logical.x, logical.y);
        controller.on_container_resized(&mut *viewport);
    } else if remeasured {
        controller.schedule_relayout();
    }

    camera.viewport = map_viewport_rect(window.physical_size(), sidebar, window.scale_factor())
        .map(|(physical_position, physical_size)| Viewport {
            physical_position,
            physical_size,
            ..default()
        });
}

/// Physical position and size of the map area right of a `sidebar_px`
/// (logical) wide panel. `None` when nothing is left for the map.
pub fn map_viewport_rect(
    window_physical: UVec2,
    sidebar_px: f32,
    scale_factor: f32,
) -> Option<(UVec2, UVec2)> {
    let left = ((sidebar_px.max(0.0) * scale_factor) as u32).min(window_physical.x);
    let size = UVec2::new(window_physical.x - left, window_physical.y);
    (size.x > 0 && size.y > 0).then_some((UVec2::new(left, 0), size))
}

pub fn sync_map_viewport(
    time: Res<Time>,
    store: Res<DashboardStore>,
    mut viewport: ResMut<MapViewport>,
    mut controller: ResMut<MapViewportController>,
) {
    controller.tick(time.delta(), &mut *viewport);
    controller.sync(&store, &mut *viewport);
}

pub fn apply_map_view(
    mut viewport: ResMut<MapViewport>,
    camera: Single<(&mut Transform, &mut Projection), (With<MapCamera>, Without<EguiContext>)>,
) {
    let Some(view) = viewport.take_changed() else {
        return;
    };
    let (mut transform, mut projection) = camera.into_inner();
    transform.translation.x = view.center.x;
    transform.translation.y = view.center.y;
    if let Projection::Orthographic(ortho) = &mut *projection {
        ortho.scale = view.scale;
    }
}

pub fn draw_world_frame(mut gizmos: Gizmos) {
    let (w, e, s, n) = (-180.0, 180.0, -90.0, 90.0);
    gizmos.linestrip_2d(
        [
            Vec2::new(w, s),
            Vec2::new(e, s),
            Vec2::new(e, n),
            Vec2::new(w, n),
            Vec2::new(w, s),
        ],
        FRAME_COLOR,
    );
    for lon in (-180 + GRATICULE_STEP_DEG..180).step_by(GRATICULE_STEP_DEG as usize) {
        let x = lon as f32;
        gizmos.line_2d(Vec2::new(x, s), Vec2::new(x, n), GRATICULE_COLOR);
    }
    for lat in (-90 + GRATICULE_STEP_DEG..90).step_by(GRATICULE_STEP_DEG as usize) {
        let y = lat as f32;
        gizmos.line_2d(Vec2::new(w, y), Vec2::new(e, y), GRATICULE_COLOR);
    }
}

pub fn draw_store_geometry(
    mut gizmos: Gizmos,
    store: Res<DashboardStore>,
    viewport: Res<MapViewport>,
) {
    let point_radius = viewport.current().map_or(1.0, |v| v.scale) * POINT_RADIUS_PX;
    if let Some(aoi) = store.aoi_geometry() {
        draw_geometry(&mut gizmos, aoi, AOI_COLOR, point_radius);
    }
    for track in store.track_geometries() {
        draw_geometry(&mut gizmos, track, TRACK_COLOR, point_radius);
    }
}

fn draw_geometry(gizmos: &mut Gizmos, geometry: &Geometry, color: Color, point_radius: f32) {
    for path in geometry.paths() {
        for segment in split_at_antimeridian(path) {
            if segment.len() >= 2 {
                gizmos.linestrip_2d(segment, color);
            }
        }
    }
    for point in geometry.points() {
        gizmos.circle_2d(to_world(point), point_radius, color);
    }
}

fn to_world(p: Position) -> Vec2 {
    Vec2::new(p.lon as f32, p.lat as f32)
}

/// Break a path where it wraps across ±180° so it is not drawn across the
/// whole map.
fn split_at_antimeridian(path: &[Position]) -> Vec<Vec<Vec2>> {
    let mut segments = Vec::new();
    let mut current: Vec<Vec2> = Vec::new();
    let mut prev: Option<Position> = None;
    for &p in path {
        if !p.lon.is_finite() || !p.lat.is_finite() {
            continue;
        }
        if let Some(q) = prev
            && (p.lon - q.lon).abs() > 180.0
        {
            segments.push(std::mem::take(&mut current));
        }
        current.push(to_world(p));
        prev = Some(p);
    }
    segments.push(current);
    segments.retain(|s| !s.is_empty());
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn path(points: &[(f64, f64)]) -> Vec<Position> {
        points.iter().map(|&(lon, lat)| Position::new(lon, lat)).collect()
    }

    #[test]
    fn continuous_track_is_one_segment() {
        let segments = split_at_antimeridian(&path(&[(0.0, 0.0), (10.0, 5.0), (20.0, 10.0)]));
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].len(), 3);
    }

    #[test]
    fn wrap_splits_track() {
        let segments =
            split_at_antimeridian(&path(&[(170.0, 0.0), (179.0, 1.0), (-179.0, 2.0), (-170.0, 3.0)]));
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], vec![Vec2::new(170.0, 0.0), Vec2::new(179.0, 1.0)]);
        assert_eq!(segments[1].len(), 2);
    }

    #[test]
    fn empty_path_has_no_segments() {
        assert!(split_at_antimeridian(&[]).is_empty());
    }

    #[test]
    fn viewport_starts_right_of_the_panel_in_physical_pixels() {
        assert_eq!(
            map_viewport_rect(UVec2::new(2560, 1440), 340.0, 2.0),
            Some((UVec2::new(680, 0), UVec2::new(1880, 1440)))
        );
        assert_eq!(
            map_viewport_rect(UVec2::new(1280, 720), 0.0, 1.0),
            Some((UVec2::ZERO, UVec2::new(1280, 720)))
        );
        assert_eq!(map_viewport_rect(UVec2::new(300, 720), 340.0, 1.0), None);
    }

    #[test]
    fn basemap_spans_the_world_behind_the_overlays() {
        let (sprite, transform, _) = basemap(Handle::default());
        assert_eq!(sprite.custom_size, Some(Vec2::new(360.0, 180.0)));
        assert_eq!(transform.translation.truncate(), Vec2::ZERO);
        assert!(transform.translation.z < 0.0);
    }

    fn layout_app() -> App {
        let mut app = App::new();
        app.init_resource::<UIState>()
            .init_resource::<MapViewport>()
            .insert_resource(MapViewportController::new(20.0, Duration::from_millis(150)))
            .add_systems(Update, layout_map_viewport);
        app.world_mut().spawn((Window::default(), PrimaryWindow));
        app
    }

    #[test]
    fn only_the_map_camera_is_cropped() {
        let mut app = layout_app();
        let map = app.world_mut().spawn((Camera::default(), MapCamera)).id();
        let overlay = app
            .world_mut()
            .spawn(Camera {
                order: 1,
                ..default()
            })
            .id();

        app.update();
        app.world_mut().resource_mut::<UIState>().sidebar_width_px = 340.0;
        app.update();

        let world = app.world();
        let cropped = world.get::<Camera>(map).unwrap().viewport.clone().unwrap();
        assert_eq!(cropped.physical_position, UVec2::new(340, 0));
        assert_eq!(cropped.physical_size, UVec2::new(940, 720));
        assert!(world.get::<Camera>(overlay).unwrap().viewport.is_none());
    }

    #[test]
    fn panel_width_settling_is_left_to_the_retry() {
        let mut app = layout_app();
        app.world_mut().spawn((Camera::default(), MapCamera));

        app.update();
        assert_eq!(
            app.world().resource::<MapViewport>().size(),
            Vec2::new(1280.0, 720.0)
        );

        app.world_mut().resource_mut::<UIState>().sidebar_width_px = 340.0;
        app.update();
        let world = app.world_mut();
        assert!(world.resource::<MapViewportController>().retry_pending());
        let mut viewport = world.remove_resource::<MapViewport>().unwrap();
        assert_eq!(viewport.size(), Vec2::new(1280.0, 720.0));

        world
            .resource_mut::<MapViewportController>()
            .tick(Duration::from_millis(200), &mut viewport);
        assert_eq!(viewport.size(), Vec2::new(940.0, 720.0));
    }
}
