use crate::storable::ObjectKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct FileMode(pub u32);

impl std::fmt::Octal for FileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:o}", self.0)
    }
}

impl FileMode {
    pub const DIRECTORY: FileMode = FileMode(0o040000);
    pub const EXECUTABLE: FileMode = FileMode(0o100755);
    pub const REGULAR: FileMode = FileMode(0o100644);
    pub const SYMLINK: FileMode = FileMode(0o120000);

    /// Normalise a raw `st_mode` of a regular file to one of the two modes a tree can hold.
    pub fn from_file_mode(raw: u32) -> Self {
        if raw & libc::S_IXUSR as u32 != 0 {
            Self::EXECUTABLE
        } else {
            Self::REGULAR
        }
    }

    /// The kind of object an entry with this mode points to.
    pub fn object_kind(self) -> ObjectKind {
        if self == Self::DIRECTORY {
            ObjectKind::Tree
        } else {
            ObjectKind::Blob
        }
    }

    pub fn is_known(self) -> bool {
        matches!(
            self,
            Self::DIRECTORY | Self::EXECUTABLE | Self::REGULAR | Self::SYMLINK
        )
    }
}
