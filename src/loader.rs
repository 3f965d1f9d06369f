use crate::{
    config::ViewerConfig,
    heightmap::Heightmap,
    mesh::TerrainMeshBuilder,
    result::{TileError, TileResult},
    tile::{TileCoordinate, TileScale},
};
use async_channel::{Receiver, TryRecvError};
use bevy::{
    image::Image,
    prelude::*,
    render::{
        render_asset::RenderAssetUsages,
        render_resource::{Extent3d, TextureDimension, TextureFormat},
    },
    tasks::IoTaskPool,
};
use image::RgbaImage;

/// A fetched tile raster with its decoded elevations.
pub struct LoadedTile {
    pub coordinate: TileCoordinate,
    pub raster: RgbaImage,
    pub heightmap: Heightmap,
}

/// The pending tile load: the receiving end of the one-shot task plus the
/// scale the finished mesh will be built with. Removed once the result has
/// been consumed.
#[derive(Resource)]
pub struct TileLoad {
    receiver: Receiver<TileResult<LoadedTile>>,
    scale: TileScale,
}

/// Marker for the published terrain surface entity.
#[derive(Component)]
pub struct TerrainSurface;

/// Validates the configured tile eagerly and spawns the load task on the IO
/// pool. An invalid configuration leaves the viewer running without terrain.
pub(crate) fn start_tile_load(mut commands: Commands, config: Res<ViewerConfig>) {
    let scale = match TileScale::new(config.tile, config.scale_factor) {
        Ok(scale) => scale,
        Err(error) => {
            error!("invalid tile configuration: {error}");
            return;
        }
    };

    let coordinate = config.tile;
    let path = coordinate.path(&config.tiles_root, "png");
    let (sender, receiver) = async_channel::bounded(1);

    info!("loading tile {coordinate} from {path}");

    IoTaskPool::get()
        .spawn(async move {
            let result = load_tile(coordinate, &path);
            let _ = sender.send(result).await;
        })
        .detach();

    commands.insert_resource(TileLoad { receiver, scale });
}

/// Opens and decodes the tile raster. Runs on the IO pool, off the frame
/// loop.
fn load_tile(coordinate: TileCoordinate, path: &str) -> TileResult<LoadedTile> {
    let raster = image::open(path)
        .map_err(|source| TileError::Image {
            path: path.to_string(),
            source,
        })?
        .into_rgba8();

    let heightmap = Heightmap::decode(&raster)?;

    Ok(LoadedTile {
        coordinate,
        raster,
        heightmap,
    })
}

/// Polls the load result once per frame. On success the terrain mesh is
/// built completely and only then spawned, so the render systems never see
/// a partial surface. On failure the reference grid stays.
pub(crate) fn finish_tile_load(
    mut commands: Commands,
    load: Res<TileLoad>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
) {
    let result = match load.receiver.try_recv() {
        Ok(result) => result,
        Err(TryRecvError::Empty) => return,
        Err(TryRecvError::Closed) => {
            warn!("tile loader stopped without a result");
            commands.remove_resource::<TileLoad>();
            return;
        }
    };

    match result {
        Ok(tile) => {
            let surface = TerrainMeshBuilder::new(&tile.heightmap, load.scale).build();
            let texture = images.add(raster_texture(&tile.raster));

            let material = materials.add(StandardMaterial {
                base_color_texture: Some(texture),
                perceptual_roughness: 1.0,
                ..default()
            });

            commands.spawn((
                TerrainSurface,
                Mesh3d(meshes.add(surface.into_mesh())),
                MeshMaterial3d(material),
            ));

            info!("terrain surface for tile {} ready", tile.coordinate);
        }
        Err(error) => {
            warn!("tile unavailable, keeping the reference grid: {error}");
        }
    }

    commands.remove_resource::<TileLoad>();
}

/// Wraps the raster bytes as a texture so the tile image doubles as the
/// surface color.
fn raster_texture(raster: &RgbaImage) -> Image {
    Image::new(
        Extent3d {
            width: raster.width(),
            height: raster.height(),
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        raster.as_raw().clone(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tile_image_is_a_load_error() {
        let coordinate = TileCoordinate::new(11, 330, 815);

        let result = load_tile(coordinate, "does/not/exist/11/330/815.png");

        assert!(matches!(result, Err(TileError::Image { .. })));
    }

    #[test]
    fn loaded_tile_keeps_raster_and_heightmap_in_sync() {
        let raster = RgbaImage::from_pixel(8, 8, image::Rgba([128, 0, 0, 255]));
        let heightmap = Heightmap::decode(&raster).unwrap();

        let tile = LoadedTile {
            coordinate: TileCoordinate::new(11, 330, 815),
            raster,
            heightmap,
        };

        assert_eq!(tile.raster.width(), tile.heightmap.width());
        assert_eq!(tile.raster.height(), tile.heightmap.height());
        assert_eq!(tile.heightmap.sample(0, 0), 0.0);
    }
}
