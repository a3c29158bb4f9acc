use crate::fs::FileSystem;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::trace;

/// Decides whether an import path names a standard-library package
pub trait StandardLibrary: Send + Sync {
    fn is_standard(&self, import_path: &str) -> bool;
}

impl<T: StandardLibrary + ?Sized> StandardLibrary for Arc<T> {
    fn is_standard(&self, import_path: &str) -> bool {
        (**self).is_standard(import_path)
    }
}

/// Looks packages up under `<root>/src/<path>`
///
/// A path containing a dot is never standard; standard packages have no
/// domain component.
pub struct GorootStdlib {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl GorootStdlib {
    pub fn new(root: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root: root.into(),
            fs,
        }
    }
}

impl StandardLibrary for GorootStdlib {
    fn is_standard(&self, import_path: &str) -> bool {
        if import_path.is_empty() || import_path.contains('.') {
            return false;
        }
        self.fs.is_dir(&self.root.join("src").join(import_path))
    }
}

/// A fixed set of standard package paths
#[derive(Debug, Clone, Default)]
pub struct StaticStdlib {
    packages: BTreeSet<String>,
}

#[rustfmt::skip]
const GO_STANDARD_PACKAGES: &[&str] = &[
    "archive/tar", "archive/zip", "bufio", "bytes", "cmp", "compress/bzip2",
    "compress/flate", "compress/gzip", "compress/lzw", "compress/zlib",
    "container/heap", "container/list", "container/ring", "context", "crypto",
    "crypto/aes", "crypto/cipher", "crypto/des", "crypto/ecdsa", "crypto/ed25519",
    "crypto/elliptic", "crypto/hmac", "crypto/md5", "crypto/rand", "crypto/rc4",
    "crypto/rsa", "crypto/sha1", "crypto/sha256", "crypto/sha512", "crypto/subtle",
    "crypto/tls", "crypto/x509", "database/sql", "database/sql/driver", "embed",
    "encoding", "encoding/ascii85", "encoding/asn1", "encoding/base32",
    "encoding/base64", "encoding/binary", "encoding/csv", "encoding/gob",
    "encoding/hex", "encoding/json", "encoding/pem", "encoding/xml", "errors",
    "expvar", "flag", "fmt", "go/ast", "go/build", "go/format", "go/parser",
    "go/printer", "go/scanner", "go/token", "go/types", "hash", "hash/adler32",
    "hash/crc32", "hash/crc64", "hash/fnv", "hash/maphash", "html",
    "html/template", "image", "image/color", "image/draw", "image/gif",
    "image/jpeg", "image/png", "io", "io/fs", "io/ioutil", "iter", "log",
    "log/slog", "log/syslog", "maps", "math", "math/big", "math/bits",
    "math/cmplx", "math/rand", "mime", "mime/multipart", "mime/quotedprintable",
    "net", "net/http", "net/http/cookiejar", "net/http/httptest",
    "net/http/httputil", "net/http/pprof", "net/mail", "net/netip", "net/rpc",
    "net/smtp", "net/textproto", "net/url", "os", "os/exec", "os/signal",
    "os/user", "path", "path/filepath", "plugin", "reflect", "regexp",
    "regexp/syntax", "runtime", "runtime/debug", "runtime/pprof", "slices",
    "sort", "strconv", "strings", "sync", "sync/atomic", "syscall", "testing",
    "text/scanner", "text/tabwriter", "text/template", "time", "unicode",
    "unicode/utf16", "unicode/utf8", "unsafe",
];

impl StaticStdlib {
    pub fn new<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            packages: packages.into_iter().map(Into::into).collect(),
        }
    }

    /// Built-in list of common Go standard packages, for runs without a root
    pub fn go_defaults() -> Self {
        Self::new(GO_STANDARD_PACKAGES.iter().copied())
    }
}

impl StandardLibrary for StaticStdlib {
    fn is_standard(&self, import_path: &str) -> bool {
        self.packages.contains(import_path)
    }
}

/// Memoizes another oracle
///
/// Safe to share between concurrent builds: an answer is computed at most
/// once per racing caller and the first one stored is the one every later
/// lookup sees.
pub struct CachedStdlib<S> {
    inner: S,
    memo: RwLock<HashMap<String, bool>>,
}

impl<S: StandardLibrary> CachedStdlib<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            memo: RwLock::new(HashMap::new()),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.memo.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl<S: StandardLibrary> StandardLibrary for CachedStdlib<S> {
    fn is_standard(&self, import_path: &str) -> bool {
        let cached = self
            .memo
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(import_path)
            .copied();
        if let Some(std) = cached {
            return std;
        }

        let computed = self.inner.is_standard(import_path);
        trace!(import_path, standard = computed, "Standard library lookup");

        *self
            .memo
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(import_path.to_string())
            .or_insert(computed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_goroot_lookup() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_dir("goroot/src/net/http");
        fs.add_dir("goroot/src/fmt");
        fs.add_dir("goroot/src/example.com/x");
        fs.add_file("goroot/src/notadir", "");

        let std = GorootStdlib::new("/mock/goroot", fs);
        assert!(std.is_standard("fmt"));
        assert!(std.is_standard("net/http"));
        assert!(std.is_standard("net"));
        assert!(!std.is_standard("example.com/x"));
        assert!(!std.is_standard("notadir"));
        assert!(!std.is_standard("github/user/repo"));
        assert!(!std.is_standard(""));
    }

    #[test]
    fn test_static_defaults() {
        let std = StaticStdlib::go_defaults();
        assert!(std.is_standard("fmt"));
        assert!(std.is_standard("net/http"));
        assert!(!std.is_standard("github.com/pkg/errors"));
        assert!(!std.is_standard("myapp/util"));
    }

    struct Counting {
        calls: AtomicUsize,
    }

    impl StandardLibrary for Counting {
        fn is_standard(&self, import_path: &str) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            import_path == "fmt"
        }
    }

    #[test]
    fn test_cached_lookups_hit_inner_once() {
        let cached = CachedStdlib::new(Counting {
            calls: AtomicUsize::new(0),
        });

        assert!(cached.is_standard("fmt"));
        assert!(cached.is_standard("fmt"));
        assert!(!cached.is_standard("app/x"));
        assert!(!cached.is_standard("app/x"));

        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cached.cached_len(), 2);
    }

    #[test]
    fn test_cached_shared_across_threads() {
        let cached = Arc::new(CachedStdlib::new(StaticStdlib::go_defaults()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cached = Arc::clone(&cached);
                std::thread::spawn(move || {
                    (cached.is_standard("os"), cached.is_standard("app/os"))
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), (true, false));
        }
        assert_eq!(cached.cached_len(), 2);
    }
}
