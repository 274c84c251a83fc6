//! Dependency Resolver - 설치 계획 계산
//!
//! 상태를 바꾸기 전에 전체 계획을 먼저 만들어, 실패 시 아무것도 설치되지 않게 합니다.

use hub_foundation::{Error, Result};
use std::collections::HashSet;

/// 의존성 그래프 조회
pub(crate) trait DependencyGraph {
    /// 등록된 플러그인의 의존성 목록 (미등록이면 None)
    fn dependencies(&self, id: &str) -> Option<&[String]>;

    fn is_installed(&self, id: &str) -> bool;
}

/// `root` 설치에 필요한, 아직 설치되지 않은 플러그인들의 위상 순서
///
/// 의존성이 먼저 오고 `root`가 마지막입니다. 각 플러그인의 `dependencies`
/// 나열 순서를 따릅니다.
pub(crate) fn install_plan<G: DependencyGraph>(graph: &G, root: &str) -> Result<Vec<String>> {
    let mut planner = Planner {
        graph,
        path: Vec::new(),
        done: HashSet::new(),
        order: Vec::new(),
    };
    planner.visit(root, None)?;
    Ok(planner.order)
}

struct Planner<'a, G> {
    graph: &'a G,
    /// 현재 DFS 경로 (사이클 검출용)
    path: Vec<String>,
    done: HashSet<String>,
    order: Vec<String>,
}

impl<'a, G: DependencyGraph> Planner<'a, G> {
    fn visit(&mut self, id: &str, required_by: Option<&str>) -> Result<()> {
        if self.done.contains(id) || self.graph.is_installed(id) {
            return Ok(());
        }

        if let Some(pos) = self.path.iter().position(|p| p == id) {
            let mut cycle = self.path[pos..].to_vec();
            cycle.push(id.to_string());
            return Err(Error::DependencyCycle(cycle));
        }

        let graph = self.graph;
        let deps = graph.dependencies(id).ok_or_else(|| match required_by {
            Some(parent) => Error::missing_dependency(parent, id),
            None => Error::UnknownPlugin(id.to_string()),
        })?;

        self.path.push(id.to_string());
        for dep in deps {
            self.visit(dep, Some(id))?;
        }
        self.path.pop();

        self.done.insert(id.to_string());
        self.order.push(id.to_string());
        Ok(())
    }
}
