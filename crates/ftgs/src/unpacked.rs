use crate::error::{FtgsError, Result};
use crate::packed::{PackedTable, GROUP_SIZE};
use crate::simd;

struct BitSet {
    words: Vec<u64>,
}

impl BitSet {
    fn new(len: usize) -> Self {
        BitSet {
            words: vec![0u64; len.div_ceil(64)],
        }
    }

    fn set(&mut self, i: usize) {
        self.words[i / 64] |= 1 << (i % 64);
    }

    fn get(&self, i: usize) -> bool {
        self.words[i / 64] & (1 << (i % 64)) != 0
    }
}

// table[code] = (lane0, lane1) = (bit1, bit0): the upper column of the
// pair lands in the first lane, the lower column in the second.
fn bool_lut_entry(code: u8) -> simd::Vec16 {
    let bit0 = (code & 1) as i64;
    let bit1 = ((code >> 1) & 1) as i64;
    let mut v = simd::ZERO;
    v[0..8].copy_from_slice(&bit1.to_le_bytes());
    v[8..16].copy_from_slice(&bit0.to_le_bytes());
    v
}

// Lanes hold raw (un-shifted-back) values, exactly as the packed table
// stores them internally; callers add min[c] when comparing against
// get_cell.
pub struct UnpackedTable {
    n_groups: usize,
    padded_row_len: usize,
    bool_lane_slots: usize,
    data: Vec<i64>,
    non_zero_rows: BitSet,
}

impl UnpackedTable {
    pub fn new(n_groups: usize, table: &PackedTable) -> Self {
        let bool_lane_pairs = table.n_boolean_cols().div_ceil(2);
        let bool_lane_slots = bool_lane_pairs * 2;
        let padded_row_len = bool_lane_slots + table.n_normal_cols();
        UnpackedTable {
            n_groups,
            padded_row_len,
            bool_lane_slots,
            data: vec![0i64; n_groups * padded_row_len],
            non_zero_rows: BitSet::new(n_groups),
        }
    }

    pub fn padded_row_len(&self) -> usize {
        self.padded_row_len
    }

    pub fn is_non_zero(&self, group_id: usize) -> bool {
        self.non_zero_rows.get(group_id)
    }

    fn lane_index(&self, group_id: usize, lane: usize) -> usize {
        group_id * self.padded_row_len + lane
    }

    fn set_lane(&mut self, group_id: usize, lane: usize, v: i64) {
        let idx = self.lane_index(group_id, lane);
        self.data[idx] = v;
    }

    pub fn lane(&self, group_id: usize, lane: usize) -> i64 {
        self.data[self.lane_index(group_id, lane)]
    }

    pub fn value(&self, group_id: usize, col: usize, n_boolean_cols: usize) -> i64 {
        let lane = if col < n_boolean_cols {
            let pair = col / 2;
            2 * pair + (1 - col % 2)
        } else {
            self.bool_lane_slots + (col - n_boolean_cols)
        };
        self.lane(group_id, lane)
    }

    pub fn unpack_row(
        &mut self,
        table: &PackedTable,
        src_row_id: usize,
        prefetch_row_id: usize,
    ) -> Result<()> {
        if src_row_id >= table.n_rows() {
            return Err(FtgsError::precondition(format!(
                "row {src_row_id} out of range (n_rows = {})",
                table.n_rows()
            )));
        }

        let header = table.header_bits(src_row_id);
        let group_id = (header & ((1u32 << GROUP_SIZE) - 1)) as usize;
        if group_id >= self.n_groups {
            return Err(FtgsError::precondition(format!(
                "row {src_row_id}'s group id {group_id} exceeds the unpacked table's {} groups",
                self.n_groups
            )));
        }

        // Step 1: expand boolean bit-fields, two columns per LUT lookup.
        let n_boolean_cols = table.n_boolean_cols();
        let bool_lane_pairs = n_boolean_cols.div_ceil(2);
        for pair in 0..bool_lane_pairs {
            let col0 = 2 * pair;
            let col1 = 2 * pair + 1;
            let bit0 = (header >> (GROUP_SIZE + col0 as u32)) & 1;
            let bit1 = if col1 < n_boolean_cols {
                (header >> (GROUP_SIZE + col1 as u32)) & 1
            } else {
                0
            };
            let code = (bit0 | (bit1 << 1)) as u8;
            let v = bool_lut_entry(code);
            self.set_lane(group_id, 2 * pair, simd::extract_i64(v, 0));
            self.set_lane(group_id, 2 * pair + 1, simd::extract_i64(v, 1));
        }

        self.non_zero_rows.set(group_id);

        // Step 2: shuffle the non-boolean columns out, four vectors at a
        // time with a prefetch of the next row's vectors in the same group.
        let n_normal = table.n_normal_cols();
        let get2 = table.shuffle_get2_entries();
        let get2_vector = table.get2_vector();
        let get2_lower_col = table.get2_lower_col();
        let row_size = table.row_size();

        let mut entry_idx = 0usize;
        let mut vector_num = 0usize;
        while vector_num < row_size {
            let group_start = vector_num;
            let group_end = (vector_num + 4).min(row_size);
            while vector_num < group_end {
                while entry_idx < get2.len() && get2_vector[entry_idx] == vector_num {
                    let v = table.vector(src_row_id, vector_num);
                    let shuffled = simd::shuffle(v, get2[entry_idx]);
                    let lower_col = get2_lower_col[entry_idx];
                    let dest_lane0 = self.bool_lane_slots + lower_col;
                    self.set_lane(group_id, dest_lane0, simd::extract_i64(shuffled, 0));
                    if lower_col + 1 < n_normal {
                        self.set_lane(group_id, dest_lane0 + 1, simd::extract_i64(shuffled, 1));
                    }
                    entry_idx += 1;
                }
                vector_num += 1;
            }
            for v in group_start..group_end {
                table.prefetch_vector(prefetch_row_id, v);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packed::PackedTable;

    #[test]
    fn unpack_fidelity_matches_get_cell_after_adding_min() {
        let mut t = PackedTable::new(4, vec![0, 0, 0], vec![1, 255, 65535]).unwrap();
        t.set_cell(2, 0, 1).unwrap();
        t.set_cell(2, 1, 42).unwrap();
        t.set_cell(2, 2, 1000).unwrap();
        t.set_group(2, 3).unwrap();

        let mut u = UnpackedTable::new(16, &t);
        u.unpack_row(&t, 2, 2).unwrap();

        for col in 0..3 {
            let expected = t.get_cell(2, col).unwrap();
            let raw = u.value(3, col, t.n_boolean_cols());
            assert_eq!(raw + t.min(col), expected);
        }
        assert!(u.is_non_zero(3));
        assert!(!u.is_non_zero(0));
    }

    #[test]
    fn s6_single_boolean_column_lands_bit_in_the_first_lane() {
        let mut t = PackedTable::new(4, vec![0, 0, 0], vec![1, 255, 65535]).unwrap();
        t.set_cell(2, 0, 1).unwrap();
        t.set_cell(2, 1, 42).unwrap();
        t.set_cell(2, 2, 1000).unwrap();
        t.set_group(2, 3).unwrap();

        let mut u = UnpackedTable::new(16, &t);
        u.unpack_row(&t, 2, 2).unwrap();

        assert_eq!(u.lane(3, 0), 0);
        assert_eq!(u.lane(3, 1), 1);
        assert_eq!(u.value(3, 1, 1), 42);
        assert_eq!(u.value(3, 2, 1), 1000);
    }

    #[test]
    fn non_zero_rows_marks_only_the_unpacked_groups() {
        let mut t = PackedTable::new(3, vec![0], vec![1]).unwrap();
        t.set_group(0, 1).unwrap();
        t.set_group(1, 5).unwrap();
        t.set_group(2, 9).unwrap();

        let mut u = UnpackedTable::new(16, &t);
        u.unpack_row(&t, 0, 1).unwrap();
        u.unpack_row(&t, 1, 2).unwrap();

        assert!(u.is_non_zero(1));
        assert!(u.is_non_zero(5));
        assert!(!u.is_non_zero(9));
    }

    #[test]
    fn unpacking_a_row_whose_group_exceeds_capacity_is_a_precondition_error() {
        let mut t = PackedTable::new(1, vec![0], vec![1]).unwrap();
        t.set_group(0, 20).unwrap();
        let mut u = UnpackedTable::new(4, &t);
        assert!(u.unpack_row(&t, 0, 0).is_err());
    }

    #[test]
    fn many_normal_columns_spanning_several_vectors_unpack_correctly() {
        // Enough wide columns to span multiple vectors and exercise the
        // four-vectors-per-loop-body grouping.
        let min = vec![0; 10];
        let max = vec![65535; 10];
        let mut t = PackedTable::new(2, min, max).unwrap();
        for col in 0..10 {
            t.set_cell(1, col, (col as i64) * 111).unwrap();
        }
        let mut u = UnpackedTable::new(4, &t);
        t.set_group(1, 2).unwrap();
        u.unpack_row(&t, 1, 0).unwrap();
        for col in 0..10 {
            let expected = t.get_cell(1, col).unwrap();
            let raw = u.value(2, col, t.n_boolean_cols());
            assert_eq!(raw + t.min(col), expected);
        }
    }
}
