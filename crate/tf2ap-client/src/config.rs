use {
    std::path::{
        Path,
        PathBuf,
    },
    wheel::{
        fs,
        traits::IoResultExt as _,
    },
};
#[cfg(windows)] use directories::ProjectDirs;
#[cfg(unix)] use xdg::BaseDirectories;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)] Wheel(#[from] wheel::Error),
    #[cfg(windows)]
    #[error("user folder not found")]
    MissingHomeDir,
    #[error("Team Fortress 2 install not found — write the path of your `Team Fortress 2` directory into {}", .0.display())]
    GameDirNotFound(PathBuf),
}

/// Steam library locations worth probing before bothering the player.
const COMMON_PATHS: &[&str] = &[
    "C:/Program Files (x86)/Steam/steamapps/common/Team Fortress 2",
    "D:/Program Files (x86)/Steam/steamapps/common/Team Fortress 2",
    "/home/user/.steam/steam/steamapps/common/Team Fortress 2",
    "/home/deck/.steam/steam/steamapps/common/Team Fortress 2",
];

fn saved_path_file() -> Result<PathBuf, Error> {
    #[cfg(unix)] { Ok(BaseDirectories::new().place_data_file("tf2ap/game-dir.txt").at_unknown()?) }
    #[cfg(windows)] { Ok(ProjectDirs::from("net", "tf2ap", "tf2ap").ok_or(Error::MissingHomeDir)?.data_dir().join("game-dir.txt")) }
}

/// Locates the game directory: the saved single-line path file wins, then the
/// common Steam paths (saving whichever matches for next time). The file is
/// the manual escape hatch when neither works.
pub async fn game_dir() -> Result<PathBuf, Error> {
    let saved = saved_path_file()?;
    if fs::exists(&saved).await? {
        let path = PathBuf::from(fs::read_to_string(&saved).await?.trim());
        if fs::exists(&path).await? {
            return Ok(path)
        }
    }
    for path in COMMON_PATHS {
        if fs::exists(path).await? {
            if let Some(parent) = saved.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&saved, path).await?;
            return Ok(PathBuf::from(path))
        }
    }
    Err(Error::GameDirNotFound(saved))
}

/// The console dump the game appends to once `con_logfile` points at it.
pub fn condump_path(game_dir: &Path) -> PathBuf {
    game_dir.join("tf").join("ap_dump.txt")
}
