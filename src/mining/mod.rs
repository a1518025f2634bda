//! Module to mine music directories in the file system

use walkdir::WalkDir;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};

use crate::domain::track::TrackMetadata;

pub mod normalize;
pub mod tags;

use normalize::normalize;
use tags::{LoftyTagReader, TagReader, read_tags};

const MUSIC_EXTENSIONS: &[&str] = &["mp3", "flac"];

/// A supported audio file found while walking a directory
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MediaFile {
    pub path: PathBuf,
    /// lowercase extension, one of the supported ones
    pub extension: String,
}

impl MediaFile {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        MUSIC_EXTENSIONS.contains(&extension.as_str()).then(|| Self {
            path: path.to_path_buf(),
            extension,
        })
    }
}

/// Walks directories and turns every readable music file into [`TrackMetadata`]
pub struct Miner<R = LoftyTagReader> {
    reader: R,
    follow_symlinks: bool,
}

impl Miner<LoftyTagReader> {
    pub fn new(follow_symlinks: bool) -> Self {
        Self::with_reader(LoftyTagReader, follow_symlinks)
    }
}

impl<R: TagReader> Miner<R> {
    pub fn with_reader(reader: R, follow_symlinks: bool) -> Self {
        Self {
            reader,
            follow_symlinks,
        }
    }

    /// Recursively mines `dir`.
    ///
    /// Never fails: a missing directory gives an empty list, and unreadable files or
    /// entries (broken symlinks, unreadable subdirectories) are skipped.
    /// Only when `dir` itself cannot be walked does mining stop early,
    /// returning the tracks found so far.
    /// Files come in file name order, directory by directory.
    pub fn mine(&self, dir: &Path) -> Vec<TrackMetadata> {
        let dir_str = dir.to_string_lossy();

        if !dir.is_dir() {
            log::warn!("directory {dir_str} does not exist, nothing to mine");
            return Vec::new();
        }

        let mut tracks = Vec::new();
        let mut skipped = 0usize;

        let walker = WalkDir::new(dir)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    log::error!("error while mining dir {dir_str}, stopping: {err}");
                    break;
                }
                Err(err) => {
                    log::warn!("error while mining dir {dir_str}, skipping entry: {err}");
                    skipped += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let Some(file) = MediaFile::from_path(entry.path()) else {
                continue;
            };

            match catch_unwind(AssertUnwindSafe(|| self.mine_file(&file))) {
                Ok(Some(track)) => tracks.push(track),
                Ok(None) => skipped += 1,
                Err(_) => {
                    log::error!(
                        "reading {} panicked, skipping it",
                        file.path.to_string_lossy()
                    );
                    skipped += 1;
                }
            }
        }

        log::info!(
            "mined {dir_str}: {} tracks, {skipped} files skipped",
            tracks.len()
        );
        tracks
    }

    fn mine_file(&self, file: &MediaFile) -> Option<TrackMetadata> {
        log::debug!("reading {} file {}", file.extension, file.path.to_string_lossy());
        let raw = read_tags(&self.reader, &file.path)?;
        Some(normalize(&raw, &file.path))
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, fs};

    use tempfile::TempDir;

    use super::*;
    use crate::{
        domain::track::{RawTagData, UNKNOWN},
        mining::tags::TagError,
    };

    /// Serves tags by file name, fails for files it does not know
    #[derive(Default)]
    struct FakeReader {
        tags: HashMap<String, RawTagData>,
    }

    impl FakeReader {
        fn with(mut self, file_name: &str, raw: RawTagData) -> Self {
            self.tags.insert(file_name.to_string(), raw);
            self
        }
    }

    impl TagReader for FakeReader {
        fn read(&self, path: &Path) -> Result<RawTagData, TagError> {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            self.tags.get(&name).cloned().ok_or_else(|| {
                TagError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "corrupt file",
                ))
            })
        }
    }

    fn titled(title: &str) -> RawTagData {
        RawTagData {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    fn is_music_file(path: &Path) -> bool {
        MediaFile::from_path(path).is_some()
    }

    #[test]
    fn is_music_file_ignores_case() {
        assert!(is_music_file(Path::new("a.mp3")));
        assert!(is_music_file(Path::new("a.MP3")));
        assert!(is_music_file(Path::new("dir/b.FlAc")));
        assert!(!is_music_file(Path::new("a.wav")));
        assert!(!is_music_file(Path::new("a.txt")));
        assert!(!is_music_file(Path::new("mp3")));
    }

    #[test]
    fn media_file_keeps_lowercase_extension() {
        let file = MediaFile::from_path(Path::new("/x/Song.FLAC")).unwrap();
        assert_eq!(file.extension, "flac");
        assert_eq!(file.path, PathBuf::from("/x/Song.FLAC"));
    }

    #[test]
    fn mine_song_a_and_ignore_text_file() {
        let tmp = TempDir::new().unwrap();
        let song = tmp.path().join("a.mp3");
        fs::write(&song, b"aaa").unwrap();
        fs::write(tmp.path().join("b.txt"), b"bbb").unwrap();

        let reader = FakeReader::default()
            .with(
                "a.mp3",
                RawTagData {
                    title: Some("Song A".into()),
                    performers: vec!["Artist X".into()],
                    album: Some("Album 1".into()),
                    year: Some(2000),
                    genres: vec!["Rock".into()],
                    track_number: Some(1),
                },
            )
            .with("b.txt", titled("should never be read"));

        let tracks = Miner::with_reader(reader, false).mine(tmp.path());

        assert_eq!(
            tracks,
            vec![TrackMetadata {
                title: "Song A".into(),
                performer: "Artist X".into(),
                album_name: "Album 1".into(),
                album_path: song.to_string_lossy().into_owned(),
                year: 2000,
                genre: "Rock".into(),
                track_number: 1,
                group_name: "Artist X".into(),
            }]
        );
    }

    #[test]
    fn mine_missing_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");

        let tracks = Miner::with_reader(FakeReader::default(), false).mine(&missing);

        assert!(tracks.is_empty());
    }

    #[test]
    fn mine_file_instead_of_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let song = tmp.path().join("a.mp3");
        fs::write(&song, b"aaa").unwrap();

        let reader = FakeReader::default().with("a.mp3", titled("A"));
        assert!(Miner::with_reader(reader, false).mine(&song).is_empty());
    }

    #[test]
    fn mine_directory_without_music_is_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes.txt"), b"x").unwrap();
        fs::write(tmp.path().join("cover.jpg"), b"x").unwrap();
        fs::write(tmp.path().join("track.wav"), b"x").unwrap();

        let reader = FakeReader::default()
            .with("notes.txt", titled("n"))
            .with("cover.jpg", titled("c"))
            .with("track.wav", titled("t"));

        assert!(Miner::with_reader(reader, false).mine(tmp.path()).is_empty());
    }

    #[test]
    fn corrupt_file_is_skipped_and_the_rest_survive() {
        let tmp = TempDir::new().unwrap();
        for name in ["1.mp3", "2.flac", "3.mp3", "4.MP3"] {
            fs::write(tmp.path().join(name), b"x").unwrap();
        }

        // 3.mp3 is unknown to the reader, so reading it fails
        let reader = FakeReader::default()
            .with("1.mp3", titled("one"))
            .with("2.flac", titled("two"))
            .with("4.MP3", titled("four"));

        let tracks = Miner::with_reader(reader, false).mine(tmp.path());

        let titles: Vec<_> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["one", "two", "four"]);
    }

    #[test]
    fn mine_recurses_in_file_name_order() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("b_album").join("disc1");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir_all(tmp.path().join("a_album")).unwrap();

        fs::write(tmp.path().join("z.mp3"), b"x").unwrap();
        fs::write(tmp.path().join("a_album").join("02.flac"), b"x").unwrap();
        fs::write(tmp.path().join("a_album").join("01.flac"), b"x").unwrap();
        fs::write(nested.join("x.mp3"), b"x").unwrap();

        let reader = FakeReader::default()
            .with("z.mp3", titled("z"))
            .with("01.flac", titled("01"))
            .with("02.flac", titled("02"))
            .with("x.mp3", titled("x"));
        let miner = Miner::with_reader(reader, false);

        let first: Vec<_> = miner.mine(tmp.path()).into_iter().map(|t| t.title).collect();
        let second: Vec<_> = miner.mine(tmp.path()).into_iter().map(|t| t.title).collect();

        assert_eq!(first, vec!["01", "02", "x", "z"]);
        assert_eq!(first, second);
    }

    #[test]
    fn untagged_file_is_mined_with_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.mp3"), b"x").unwrap();

        let reader = FakeReader::default().with("a.mp3", RawTagData::default());
        let tracks = Miner::with_reader(reader, false).mine(tmp.path());

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title, UNKNOWN);
        assert_eq!(tracks[0].performer, UNKNOWN);
        assert_eq!(tracks[0].group_name, UNKNOWN);
    }

    #[test]
    fn music_named_directory_is_not_a_file() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("live.mp3")).unwrap();

        let reader = FakeReader::default().with("live.mp3", titled("dir"));
        assert!(Miner::with_reader(reader, false).mine(tmp.path()).is_empty());
    }

    /// Panics on one file name, serves a title derived from the name otherwise
    struct PanickingReader {
        poisoned: &'static str,
    }

    impl TagReader for PanickingReader {
        fn read(&self, path: &Path) -> Result<RawTagData, TagError> {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            if name == self.poisoned {
                panic!("decoder blew up on {name}");
            }
            Ok(titled(&name))
        }
    }

    #[test]
    fn panicking_reader_only_loses_its_file() {
        let tmp = TempDir::new().unwrap();
        for name in ["a.mp3", "b.flac", "c.mp3"] {
            fs::write(tmp.path().join(name), b"x").unwrap();
        }

        let reader = PanickingReader { poisoned: "b.flac" };
        let tracks = Miner::with_reader(reader, false).mine(tmp.path());

        let titles: Vec<_> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a.mp3", "c.mp3"]);
    }

    #[cfg(unix)]
    fn dir_with_dangling_symlink() -> TempDir {
        let tmp = TempDir::new().unwrap();
        std::os::unix::fs::symlink(
            tmp.path().join("missing_target.mp3"),
            tmp.path().join("a_dangling.mp3"),
        )
        .unwrap();
        fs::write(tmp.path().join("b.mp3"), b"x").unwrap();
        fs::write(tmp.path().join("c.flac"), b"x").unwrap();
        tmp
    }

    #[cfg(unix)]
    fn songs_b_and_c() -> FakeReader {
        FakeReader::default()
            .with("a_dangling.mp3", titled("dangling"))
            .with("b.mp3", titled("b"))
            .with("c.flac", titled("c"))
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_does_not_stop_mining_when_following_links() {
        let tmp = dir_with_dangling_symlink();

        let tracks = Miner::with_reader(songs_b_and_c(), true).mine(tmp.path());

        let titles: Vec<_> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "c"]);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_ignored_without_following_links() {
        let tmp = dir_with_dangling_symlink();

        let tracks = Miner::with_reader(songs_b_and_c(), false).mine(tmp.path());

        let titles: Vec<_> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "c"]);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_does_not_stop_mining() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let locked = tmp.path().join("a_locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("hidden.mp3"), b"x").unwrap();
        fs::write(tmp.path().join("b.mp3"), b"x").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let reader = FakeReader::default()
            .with("hidden.mp3", titled("hidden"))
            .with("b.mp3", titled("b"));
        let tracks = Miner::with_reader(reader, false).mine(tmp.path());

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        // root can still read the locked directory
        let titles: Vec<_> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert!(titles == vec!["b"] || titles == vec!["hidden", "b"]);
    }

    #[test]
    fn lofty_miner_reads_tagged_flac() {
        let tmp = TempDir::new().unwrap();
        let song = tmp.path().join("a.flac");
        let bytes = tags::tests::flac_with_comments(tags::tests::SONG_A_COMMENTS);
        fs::write(&song, bytes).unwrap();
        fs::write(tmp.path().join("notes.txt"), b"not music").unwrap();

        let tracks = Miner::new(false).mine(tmp.path());

        assert_eq!(
            tracks,
            vec![TrackMetadata {
                title: "Song A".into(),
                performer: "Artist X".into(),
                album_name: "Album 1".into(),
                album_path: song.to_string_lossy().into_owned(),
                year: 2000,
                genre: "Rock".into(),
                track_number: 1,
                group_name: "Artist X".into(),
            }]
        );
    }

    #[test]
    fn lofty_miner_skips_garbage_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("broken.flac"), b"not audio at all").unwrap();

        assert!(Miner::new(false).mine(tmp.path()).is_empty());
    }
}
