//! Profile command handlers.

use std::path::Path;

use anyhow::Result;
use board_core::Board;
use board_core::profile::ProfileImage;

pub async fn upload(board: &mut Board, path: &Path) -> Result<()> {
    let image = ProfileImage::load(path).await?;
    let (file_name, mime) = (image.file_name.clone(), image.mime.clone());
    board.upload_profile_image(image).await?;
    println!("Uploaded {file_name} ({mime})");
    Ok(())
}
