// crates/rsm_physics/src/mesh.rs

//! 面拓扑
//!
//! 求解器与扩散系数构建只需要单元体积和面的连接关系，
//! 这里不引入完整网格对象，只保存最小的有限体积几何。

use glam::DVec3;

use rsm_foundation::{RsmError, RsmResult};

/// 内部面
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InternalFace {
    /// (owner, neighbor)，面矢量由 owner 指向 neighbor
    pub cells: (usize, usize),
    /// 面积矢量 [m²]
    pub surface: DVec3,
    /// 两单元中心距离 [m]
    pub distance: f64,
}

/// 边界面
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryFace {
    /// 所属单元
    pub cell: usize,
    /// 外法向面积矢量 [m²]
    pub surface: DVec3,
    /// 单元中心到面的距离 [m]
    pub distance: f64,
}

/// 单元视角下的相邻内部面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellFace {
    /// 内部面索引
    pub face: usize,
    /// 相邻单元
    pub neighbor: usize,
    /// 本单元是否为 owner
    pub is_owner: bool,
}

/// 有限体积面拓扑
#[derive(Debug, Clone)]
pub struct FaceTopology {
    volumes: Vec<f64>,
    centers: Vec<DVec3>,
    internal: Vec<InternalFace>,
    boundary: Vec<BoundaryFace>,
    cell_faces: Vec<Vec<CellFace>>,
    cell_boundary: Vec<Vec<usize>>,
}

impl FaceTopology {
    /// 创建并校验拓扑
    pub fn new(
        volumes: Vec<f64>,
        centers: Vec<DVec3>,
        internal: Vec<InternalFace>,
        boundary: Vec<BoundaryFace>,
    ) -> RsmResult<Self> {
        let n = volumes.len();
        if centers.len() != n {
            return Err(RsmError::size_mismatch("centers", n, centers.len()));
        }
        if let Some(c) = volumes.iter().position(|&v| !(v > 0.0)) {
            return Err(RsmError::invalid_input(format!("单元 {c} 的体积必须为正")));
        }

        let mut cell_faces = vec![Vec::new(); n];
        for (f, face) in internal.iter().enumerate() {
            let (i, j) = face.cells;
            if i >= n || j >= n || i == j {
                return Err(RsmError::invalid_input(format!("内部面 {f} 的单元索引无效: ({i}, {j})")));
            }
            if !(face.distance > 0.0) {
                return Err(RsmError::invalid_input(format!("内部面 {f} 的距离必须为正")));
            }
            cell_faces[i].push(CellFace { face: f, neighbor: j, is_owner: true });
            cell_faces[j].push(CellFace { face: f, neighbor: i, is_owner: false });
        }

        let mut cell_boundary = vec![Vec::new(); n];
        for (f, face) in boundary.iter().enumerate() {
            if face.cell >= n {
                return Err(RsmError::invalid_input(format!("边界面 {f} 的单元索引越界: {}", face.cell)));
            }
            if !(face.distance > 0.0) {
                return Err(RsmError::invalid_input(format!("边界面 {f} 的距离必须为正")));
            }
            cell_boundary[face.cell].push(f);
        }

        Ok(Self { volumes, centers, internal, boundary, cell_faces, cell_boundary })
    }

    /// 结构化长方体网格，单元编号 `i + nx·(j + ny·k)`
    pub fn structured_box(dims: [usize; 3], spacing: [f64; 3]) -> RsmResult<Self> {
        let [nx, ny, nz] = dims;
        let [dx, dy, dz] = spacing;
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(RsmError::invalid_input("网格每个方向至少一个单元"));
        }
        let id = |i: usize, j: usize, k: usize| i + nx * (j + ny * k);
        let n = nx * ny * nz;
        let volume = dx * dy * dz;
        let areas = [dy * dz, dx * dz, dx * dy];
        let widths = [dx, dy, dz];

        let mut centers = Vec::with_capacity(n);
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    centers.push(DVec3::new(
                        (i as f64 + 0.5) * dx,
                        (j as f64 + 0.5) * dy,
                        (k as f64 + 0.5) * dz,
                    ));
                }
            }
        }

        let mut internal = Vec::new();
        let mut boundary = Vec::new();
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let c = id(i, j, k);
                    let idx = [i, j, k];
                    for axis in 0..3 {
                        let mut unit = DVec3::ZERO;
                        unit[axis] = 1.0;
                        let s = unit * areas[axis];
                        let count = dims[axis];
                        if idx[axis] + 1 < count {
                            let mut nb = idx;
                            nb[axis] += 1;
                            internal.push(InternalFace {
                                cells: (c, id(nb[0], nb[1], nb[2])),
                                surface: s,
                                distance: widths[axis],
                            });
                        } else {
                            boundary.push(BoundaryFace { cell: c, surface: s, distance: 0.5 * widths[axis] });
                        }
                        if idx[axis] == 0 {
                            boundary.push(BoundaryFace { cell: c, surface: -s, distance: 0.5 * widths[axis] });
                        }
                    }
                }
            }
        }

        Self::new(vec![volume; n], centers, internal, boundary)
    }

    /// 单元数
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.volumes.len()
    }

    /// 单元体积
    #[inline]
    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    /// 单元中心
    #[inline]
    pub fn centers(&self) -> &[DVec3] {
        &self.centers
    }

    /// 内部面
    #[inline]
    pub fn internal_faces(&self) -> &[InternalFace] {
        &self.internal
    }

    /// 边界面
    #[inline]
    pub fn boundary_faces(&self) -> &[BoundaryFace] {
        &self.boundary
    }

    /// 单元的相邻内部面
    #[inline]
    pub fn cell_faces(&self, cell: usize) -> &[CellFace] {
        &self.cell_faces[cell]
    }

    /// 单元的边界面索引
    #[inline]
    pub fn cell_boundary_faces(&self, cell: usize) -> &[usize] {
        &self.cell_boundary[cell]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_box_counts() {
        let topo = FaceTopology::structured_box([3, 2, 1], [1.0, 0.5, 2.0]).unwrap();
        assert_eq!(topo.n_cells(), 6);
        // x: 2*2*1, y: 3*1*1, z: 0
        assert_eq!(topo.internal_faces().len(), 7);
        // 2*(2*1) + 2*(3*1) + 2*(3*2)
        assert_eq!(topo.boundary_faces().len(), 22);
        assert!((topo.volumes()[0] - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_closed_cells_sum_to_zero() {
        let topo = FaceTopology::structured_box([2, 2, 2], [1.0, 1.0, 1.0]).unwrap();
        for c in 0..topo.n_cells() {
            let mut sum = DVec3::ZERO;
            for cf in topo.cell_faces(c) {
                let s = topo.internal_faces()[cf.face].surface;
                sum += if cf.is_owner { s } else { -s };
            }
            for &b in topo.cell_boundary_faces(c) {
                sum += topo.boundary_faces()[b].surface;
            }
            assert!(sum.length() < 1e-14, "单元 {c} 不封闭");
        }
    }

    #[test]
    fn test_invalid_face_rejected() {
        let face = InternalFace { cells: (0, 5), surface: DVec3::X, distance: 1.0 };
        let res = FaceTopology::new(vec![1.0, 1.0], vec![DVec3::ZERO; 2], vec![face], vec![]);
        assert!(res.is_err());
    }
}
