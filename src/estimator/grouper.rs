use std::collections::HashMap;

/// 一组被视为同构的兄弟目录
///
/// members 保持它们在目录列表中出现的顺序，第一个成员
/// 作为代表被完整递归，其余成员复用代表的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingGroup {
    /// 去掉数字后的公共名称
    pub base: String,
    /// 组内目录名，按出现顺序
    pub members: Vec<String>,
}

impl SiblingGroup {
    pub fn representative(&self) -> &str {
        &self.members[0]
    }
}

/// 兄弟目录分组器
///
/// 命名启发式集中在这里：名称去掉所有 ASCII 数字后相同的
/// 兄弟目录归为一组。换一种相似性判定只需要替换这个类型。
#[derive(Debug, Clone, Copy, Default)]
pub struct SiblingGrouper;

impl SiblingGrouper {
    pub fn new() -> Self {
        Self
    }

    /// 把同一目录下的子目录名分组，组按首个成员的出现顺序排列
    pub fn group(&self, names: &[&str]) -> Vec<SiblingGroup> {
        let mut groups: Vec<SiblingGroup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for name in names {
            let base = strip_digits(name);
            match index.get(&base) {
                Some(&slot) => groups[slot].members.push((*name).to_string()),
                None => {
                    index.insert(base.clone(), groups.len());
                    groups.push(SiblingGroup {
                        base,
                        members: vec![(*name).to_string()],
                    });
                }
            }
        }
        groups
    }
}

fn strip_digits(name: &str) -> String {
    name.chars().filter(|c| !c.is_ascii_digit()).collect()
}
