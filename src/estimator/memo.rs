use crate::estimator::signature::PatternSignature;

/// 已见目录指纹注册表
///
/// 指纹按首次出现的顺序登记，整个运行期内不替换。
/// 含特权文件的指纹同样登记，但因为指纹判定的特权保护，
/// 它们永远不会命中别的目录。
#[derive(Debug, Default)]
pub struct PatternMemo {
    entries: Vec<(String, PatternSignature)>,
}

impl PatternMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一个目录的指纹
    ///
    /// 若已有相同指纹，返回首个登记者的路径且不再登记；
    /// 否则登记该目录并返回 None。
    pub fn observe(&mut self, path: &str, signature: PatternSignature) -> Option<String> {
        if !signature.has_privileged {
            for (seen_path, seen_sig) in &self.entries {
                if seen_sig.matches(&signature) {
                    return Some(seen_path.clone());
                }
            }
        }
        self.entries.push((path.to_string(), signature));
        None
    }

    /// 登记的唯一指纹数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::signature::PrivilegedFormats;
    use crate::models::Entry;

    fn signature_of(entries: &[Entry]) -> PatternSignature {
        PatternSignature::compute(entries, &PrivilegedFormats::default()).unwrap()
    }

    #[test]
    fn test_first_seen_path_wins() {
        let mut memo = PatternMemo::new();
        let listing = vec![Entry::file("a.txt", 1), Entry::file("b.txt", 2)];

        assert!(memo.observe("./first", signature_of(&listing)).is_none());
        assert_eq!(
            memo.observe("./second", signature_of(&listing)).as_deref(),
            Some("./first")
        );
        // 命中后注册表不变，第三个目录仍然指向首个登记者
        assert_eq!(
            memo.observe("./third", signature_of(&listing)).as_deref(),
            Some("./first")
        );
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_privileged_signatures_registered_but_never_matched() {
        let mut memo = PatternMemo::new();
        let nc_listing = vec![Entry::file("prof.nc", 100)];

        assert!(memo.observe("./nc1", signature_of(&nc_listing)).is_none());
        assert!(memo.observe("./nc2", signature_of(&nc_listing)).is_none());
        assert_eq!(memo.len(), 2);
    }

    #[test]
    fn test_distinct_signatures_coexist() {
        let mut memo = PatternMemo::new();
        let a = vec![Entry::file("a.txt", 1)];
        let b = vec![Entry::file("a.txt", 1), Entry::file("b.csv", 2)];

        assert!(memo.observe("./a", signature_of(&a)).is_none());
        assert!(memo.observe("./b", signature_of(&b)).is_none());
        assert_eq!(memo.len(), 2);
    }
}
