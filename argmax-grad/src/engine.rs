use std::{
    cell::{Ref, RefCell, RefMut},
    collections::HashSet,
    fmt::{self, Display},
    iter::Sum,
    ops::{Add, Div, Mul, Neg, Sub},
    rc::Rc,
    sync::atomic::{AtomicUsize, Ordering},
};

pub type ScalarTensorUniqueID = usize;

static NEXT_UNIQUE_ID: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    NONE,
    ADD,
    MUL,
    POW(f32),
    EXP,
    LN,
}

impl Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::NONE => write!(f, ""),
            Op::ADD => write!(f, "+"),
            Op::MUL => write!(f, "*"),
            Op::POW(exponent) => write!(f, "^{}", exponent),
            Op::EXP => write!(f, "exp"),
            Op::LN => write!(f, "ln"),
        }
    }
}

///
/// Scalar tensor is a single value object that stores its
/// data and its gradient.
/// In order for backpropagation to work we also keep the building
/// blocks of this tensor, the so called children, together with the
/// operation that combined them.
pub struct ScalarTensor {
    pub data: f32,
    pub grad: f32,
    pub unique_id: ScalarTensorUniqueID,
    pub children: Vec<MutableScalarTensor>,
    op: Op,
}

/// Shared handle to a [`ScalarTensor`]. A node may feed several outputs,
/// so the graph is built out of reference counted cells.
#[derive(Clone)]
pub struct MutableScalarTensor(Rc<RefCell<ScalarTensor>>);

impl ScalarTensor {
    /// Creates a leaf tensor.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(data: f32) -> MutableScalarTensor {
        Self::from_op(data, vec![], Op::NONE)
    }

    fn from_op(data: f32, children: Vec<MutableScalarTensor>, op: Op) -> MutableScalarTensor {
        MutableScalarTensor(Rc::new(RefCell::new(Self {
            data,
            grad: 0.0,
            unique_id: NEXT_UNIQUE_ID.fetch_add(1, Ordering::Relaxed),
            children,
            op,
        })))
    }

    pub fn zero_grad(&mut self) {
        self.grad = 0.0;
    }
}

impl Display for ScalarTensor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "(data: {} | grad: {} | op: {})",
            self.data, self.grad, self.op
        )
    }
}

impl MutableScalarTensor {
    pub fn borrow(&self) -> Ref<'_, ScalarTensor> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, ScalarTensor> {
        self.0.borrow_mut()
    }

    pub fn data(&self) -> f32 {
        self.borrow().data
    }

    pub fn grad(&self) -> f32 {
        self.borrow().grad
    }

    pub fn pow(&self, exponent: f32) -> MutableScalarTensor {
        let data = self.data().powf(exponent);
        ScalarTensor::from_op(data, vec![self.clone()], Op::POW(exponent))
    }

    pub fn exp(&self) -> MutableScalarTensor {
        let data = self.data().exp();
        ScalarTensor::from_op(data, vec![self.clone()], Op::EXP)
    }

    pub fn ln(&self) -> MutableScalarTensor {
        let data = self.data().ln();
        ScalarTensor::from_op(data, vec![self.clone()], Op::LN)
    }

    fn add_tensor(&self, rhs: &MutableScalarTensor) -> MutableScalarTensor {
        let data = self.data() + rhs.data();
        ScalarTensor::from_op(data, vec![self.clone(), rhs.clone()], Op::ADD)
    }

    fn mul_tensor(&self, rhs: &MutableScalarTensor) -> MutableScalarTensor {
        let data = self.data() * rhs.data();
        ScalarTensor::from_op(data, vec![self.clone(), rhs.clone()], Op::MUL)
    }

    fn sub_tensor(&self, rhs: &MutableScalarTensor) -> MutableScalarTensor {
        self.add_tensor(&-rhs)
    }

    fn div_tensor(&self, rhs: &MutableScalarTensor) -> MutableScalarTensor {
        self.mul_tensor(&rhs.pow(-1.0))
    }

    /// Applies the chain rule for the operation that produced this tensor,
    /// adding the local derivative times this tensor's gradient to every child.
    fn grad_fn(&self) {
        let current = self.borrow();
        let grad = current.grad;
        match current.op {
            Op::NONE => (),
            Op::ADD => {
                for child in current.children.iter() {
                    child.borrow_mut().grad += grad;
                }
            }
            Op::MUL => {
                let lhs = &current.children[0];
                let rhs = &current.children[1];
                let (lhs_data, rhs_data) = (lhs.data(), rhs.data());
                lhs.borrow_mut().grad += rhs_data * grad;
                rhs.borrow_mut().grad += lhs_data * grad;
            }
            Op::POW(exponent) => {
                let base = &current.children[0];
                let local = exponent * base.data().powf(exponent - 1.0);
                base.borrow_mut().grad += local * grad;
            }
            Op::EXP => {
                // d/dx e^x = e^x, which is this tensor's own data
                current.children[0].borrow_mut().grad += current.data * grad;
            }
            Op::LN => {
                let input = &current.children[0];
                let local = 1.0 / input.data();
                input.borrow_mut().grad += local * grad;
            }
        }
    }

    fn build_topo(
        current: &MutableScalarTensor,
        visited: &mut HashSet<ScalarTensorUniqueID>,
        topo: &mut Vec<MutableScalarTensor>,
    ) {
        let unique_id = current.borrow().unique_id;
        if visited.insert(unique_id) {
            let children = current.borrow().children.clone();
            for child in children.iter() {
                Self::build_topo(child, visited, topo);
            }
            topo.push(current.clone());
        }
    }

    fn build_reversed_topo(&self) -> Vec<MutableScalarTensor> {
        let mut visited = HashSet::new();
        let mut topo = Vec::new();
        Self::build_topo(self, &mut visited, &mut topo);
        topo.reverse();
        topo
    }

    /// Backpropagates from this tensor through the whole graph that built it.
    /// Gradients accumulate, so parameters must be zeroed between steps.
    pub fn backward(&self) {
        self.borrow_mut().grad = 1.0;
        for tensor in self.build_reversed_topo() {
            tensor.grad_fn();
        }
    }
}

impl Display for MutableScalarTensor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.borrow())
    }
}

impl fmt::Debug for MutableScalarTensor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.borrow())
    }
}

macro_rules! impl_binary_op {
    ($op:ident, $method:ident, $tensor_fn:ident) => {
        impl $op<&MutableScalarTensor> for &MutableScalarTensor {
            type Output = MutableScalarTensor;

            fn $method(self, rhs: &MutableScalarTensor) -> MutableScalarTensor {
                self.$tensor_fn(rhs)
            }
        }

        impl $op<MutableScalarTensor> for MutableScalarTensor {
            type Output = MutableScalarTensor;

            fn $method(self, rhs: MutableScalarTensor) -> MutableScalarTensor {
                self.$tensor_fn(&rhs)
            }
        }

        impl $op<&MutableScalarTensor> for MutableScalarTensor {
            type Output = MutableScalarTensor;

            fn $method(self, rhs: &MutableScalarTensor) -> MutableScalarTensor {
                self.$tensor_fn(rhs)
            }
        }

        impl $op<MutableScalarTensor> for &MutableScalarTensor {
            type Output = MutableScalarTensor;

            fn $method(self, rhs: MutableScalarTensor) -> MutableScalarTensor {
                self.$tensor_fn(&rhs)
            }
        }

        impl $op<f32> for &MutableScalarTensor {
            type Output = MutableScalarTensor;

            fn $method(self, rhs: f32) -> MutableScalarTensor {
                self.$tensor_fn(&ScalarTensor::new(rhs))
            }
        }

        impl $op<f32> for MutableScalarTensor {
            type Output = MutableScalarTensor;

            fn $method(self, rhs: f32) -> MutableScalarTensor {
                self.$tensor_fn(&ScalarTensor::new(rhs))
            }
        }
    };
}

impl_binary_op!(Add, add, add_tensor);
impl_binary_op!(Sub, sub, sub_tensor);
impl_binary_op!(Mul, mul, mul_tensor);
impl_binary_op!(Div, div, div_tensor);

impl Neg for &MutableScalarTensor {
    type Output = MutableScalarTensor;

    fn neg(self) -> MutableScalarTensor {
        self.mul_tensor(&ScalarTensor::new(-1.0))
    }
}

impl Neg for MutableScalarTensor {
    type Output = MutableScalarTensor;

    fn neg(self) -> MutableScalarTensor {
        -&self
    }
}

impl Sum for MutableScalarTensor {
    fn sum<I: Iterator<Item = MutableScalarTensor>>(iter: I) -> Self {
        // Start from the first element to avoid a useless 0 node
        iter.reduce(|acc, x| acc + x)
            .unwrap_or_else(|| ScalarTensor::new(0.0))
    }
}

impl<'a> Sum<&'a MutableScalarTensor> for MutableScalarTensor {
    fn sum<I: Iterator<Item = &'a MutableScalarTensor>>(iter: I) -> Self {
        iter.cloned().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(expected: f32, real: f32) {
        assert!(
            (expected - real).abs() < 1e-5,
            "expected: {}, real: {}",
            expected,
            real
        );
    }

    #[test]
    fn test_leaf_tensor() {
        let t = ScalarTensor::new(5.0);
        let t = t.borrow();
        assert_eq!(5.0, t.data);
        assert_eq!(0.0, t.grad);
        assert_eq!(0, t.children.len());
    }

    #[test]
    fn test_unique_ids_differ() {
        let t1 = ScalarTensor::new(1.0);
        let t2 = ScalarTensor::new(1.0);
        assert_ne!(t1.borrow().unique_id, t2.borrow().unique_id);
    }

    #[test]
    fn test_addition_tensor() {
        let t1 = ScalarTensor::new(3.14);
        let t2 = ScalarTensor::new(5.0);
        let out = &t1 + &t2;
        assert_eq!(2, out.borrow().children.len());
        assert_close(8.14, out.data());
    }

    #[test]
    fn test_build_reversed_topo() {
        let t1 = ScalarTensor::new(3.14);
        let t2 = ScalarTensor::new(5.0);
        let out = &t1 + &t2;
        let topo: Vec<ScalarTensorUniqueID> = out
            .build_reversed_topo()
            .iter()
            .map(|t| t.borrow().unique_id)
            .collect();
        assert_eq!(
            vec![
                out.borrow().unique_id,
                t2.borrow().unique_id,
                t1.borrow().unique_id
            ],
            topo
        );
    }

    #[test]
    fn test_addition_backward() {
        let t1 = ScalarTensor::new(3.14);
        let t2 = ScalarTensor::new(5.0);
        let out = &t1 + &t2;
        out.backward();
        assert_eq!(1.0, t1.grad());
        assert_eq!(1.0, t2.grad());
        assert_eq!(1.0, out.grad());
    }

    #[test]
    fn test_mul_backward() {
        let a = ScalarTensor::new(2.0);
        let b = ScalarTensor::new(-3.0);
        let out = &a * &b;
        out.backward();
        assert_close(-6.0, out.data());
        assert_close(-3.0, a.grad());
        assert_close(2.0, b.grad());
    }

    #[test]
    fn test_shared_node_accumulates() {
        // d/dx x * x = 2x
        let x = ScalarTensor::new(3.0);
        let out = &x * &x;
        out.backward();
        assert_close(6.0, x.grad());
    }

    #[test]
    fn test_sub_and_div_backward() {
        let a = ScalarTensor::new(4.0);
        let b = ScalarTensor::new(2.0);
        let out = (&a - &b) / &b;
        out.backward();
        assert_close(1.0, out.data());
        // (a - b) / b = a / b - 1
        assert_close(0.5, a.grad());
        assert_close(-1.0, b.grad());
    }

    #[test]
    fn test_pow_exp_ln_backward() {
        let x = ScalarTensor::new(2.0);
        let squared = x.pow(2.0);
        squared.backward();
        assert_close(4.0, x.grad());

        let y = ScalarTensor::new(0.5);
        let e = y.exp();
        e.backward();
        assert_close(0.5f32.exp(), y.grad());

        let z = ScalarTensor::new(4.0);
        let l = z.ln();
        l.backward();
        assert_close(0.25, z.grad());
        assert_close(4.0f32.ln(), l.data());
    }

    #[test]
    fn test_scalar_operands() {
        let x = ScalarTensor::new(2.0);
        let out = (&x * 3.0 + 1.0) - 2.0;
        out.backward();
        assert_close(5.0, out.data());
        assert_close(3.0, x.grad());
    }

    #[test]
    fn test_sum() {
        let values = vec![
            ScalarTensor::new(1.0),
            ScalarTensor::new(2.0),
            ScalarTensor::new(3.0),
        ];
        let total: MutableScalarTensor = values.iter().sum();
        total.backward();
        assert_close(6.0, total.data());
        for v in values.iter() {
            assert_close(1.0, v.grad());
        }

        let empty: MutableScalarTensor = Vec::<MutableScalarTensor>::new().into_iter().sum();
        assert_eq!(0.0, empty.data());
    }

    #[test]
    fn test_zero_grad() {
        let a = ScalarTensor::new(2.0);
        let out = &a * 4.0;
        out.backward();
        assert_close(4.0, a.grad());
        a.borrow_mut().zero_grad();
        assert_eq!(0.0, a.grad());
    }
}
