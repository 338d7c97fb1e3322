//! Binary model format.
//!
//! | field               | size                 |
//! |---------------------|----------------------|
//! | magic `diwa`        | 4 bytes              |
//! | input count         | 4 bytes              |
//! | hidden width        | 4 bytes              |
//! | hidden layer count  | 4 bytes              |
//! | output count        | 4 bytes              |
//! | weight count        | 4 bytes              |
//! | neuron count        | 4 bytes              |
//! | weights             | weight count × 8     |
//!
//! Counts are signed 32-bit little-endian integers. Weights are `f64` in the byte order of the
//! host that wrote them, so a model only moves between hosts of the same float endianness.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter},
    iter,
    path::Path,
};

use crate::{
    ByteSink, ByteSource, DiwaError, DiwaResult, IoStream, NeuralNetwork, Topology,
    core::WeightBuffer,
};

pub const MAGIC: [u8; 4] = *b"diwa";

const N_FIELDS: usize = 6;

/// Byte length of the header fields following the magic.
pub const HEADER_FIELDS_LEN: usize = N_FIELDS * 4;

/// Header fields in the order they are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    pub n_inputs: i32,
    pub hidden_width: i32,
    pub n_hidden_layers: i32,
    pub n_outputs: i32,
    pub weight_count: i32,
    pub neuron_count: i32,
}

impl Header {
    pub fn for_topology(topology: &Topology) -> DiwaResult<Self> {
        let field = |name: &str, value: usize| {
            i32::try_from(value).map_err(|_| {
                DiwaError::invalid_params(format!("{name} {value} does not fit in a model header"))
            })
        };
        Ok(Self {
            n_inputs: field("input count", topology.n_inputs())?,
            hidden_width: field("hidden width", topology.hidden_width())?,
            n_hidden_layers: field("hidden layer count", topology.n_hidden_layers())?,
            n_outputs: field("output count", topology.n_outputs())?,
            weight_count: field("weight count", topology.weight_count())?,
            neuron_count: field("neuron count", topology.neuron_count())?,
        })
    }

    fn fields(&self) -> [i32; N_FIELDS] {
        [
            self.n_inputs,
            self.hidden_width,
            self.n_hidden_layers,
            self.n_outputs,
            self.weight_count,
            self.neuron_count,
        ]
    }

    pub fn to_bytes(&self) -> [u8; HEADER_FIELDS_LEN] {
        let mut bytes = [0u8; HEADER_FIELDS_LEN];
        for (chunk, field) in iter::zip(bytes.chunks_exact_mut(4), self.fields()) {
            chunk.copy_from_slice(&field.to_le_bytes());
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8; HEADER_FIELDS_LEN]) -> Self {
        let mut fields = [0i32; N_FIELDS];
        for (field, chunk) in iter::zip(&mut fields, bytes.chunks_exact(4)) {
            *field = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        let [
            n_inputs,
            hidden_width,
            n_hidden_layers,
            n_outputs,
            weight_count,
            neuron_count,
        ] = fields;
        Self {
            n_inputs,
            hidden_width,
            n_hidden_layers,
            n_outputs,
            weight_count,
            neuron_count,
        }
    }

    /// The topology the header describes.
    ///
    /// Rejects negative counts, and weight/neuron counts that disagree with the declared
    /// layer sizes, so a corrupted header can never make the weight read over- or under-fill
    /// the network.
    pub fn topology(&self) -> DiwaResult<Topology> {
        let count = |name: &str, value: i32| {
            usize::try_from(value).map_err(|_| {
                DiwaError::invalid_params(format!("negative {name} {value} in model header"))
            })
        };
        let topology = Topology::new(
            count("input count", self.n_inputs)?,
            count("hidden layer count", self.n_hidden_layers)?,
            count("hidden width", self.hidden_width)?,
            count("output count", self.n_outputs)?,
        );
        let declared = (
            count("weight count", self.weight_count)?,
            count("neuron count", self.neuron_count)?,
        );
        let expected = topology.checked_counts().ok_or_else(|| {
            DiwaError::invalid_params(format!("topology {topology:?} does not fit in memory"))
        })?;
        if declared != expected {
            return Err(DiwaError::invalid_params(format!(
                "model header declares {} weights and {} neurons, {topology:?} has {} and {}",
                declared.0, declared.1, expected.0, expected.1,
            )));
        }
        Ok(topology)
    }
}

fn write(sink: &mut impl ByteSink, bytes: &[u8]) -> DiwaResult<()> {
    sink.write_bytes(bytes)
        .map_err(|source| DiwaError::ModelSaveError { source })
}

fn read(source: &mut impl ByteSource, buf: &mut [u8]) -> DiwaResult<()> {
    source
        .read_bytes(buf)
        .map_err(|source| DiwaError::ModelReadError { source })
}

/// Writes the topology and weights of `nn` to `sink`.
pub fn save(nn: &NeuralNetwork, sink: &mut impl ByteSink) -> DiwaResult<()> {
    if !sink.is_ready() {
        return Err(DiwaError::StreamNotOpen);
    }
    let header = Header::for_topology(nn.topology())?;
    write(sink, &MAGIC)?;
    write(sink, &header.to_bytes())?;
    write(sink, bytemuck::cast_slice(nn.weights_as_slice()))?;
    sink.flush()
        .map_err(|source| DiwaError::ModelSaveError { source })?;
    log::info!(
        "saved model {:?} ({} weights)",
        nn.topology(),
        header.weight_count
    );
    Ok(())
}

/// Reads a model from `source` into `nn`.
///
/// `nn` is only modified once the whole model has been read and checked; weights are taken
/// as stored, never randomized.
pub fn load(nn: &mut NeuralNetwork, source: &mut impl ByteSource) -> DiwaResult<()> {
    if !source.is_ready() {
        return Err(DiwaError::StreamNotOpen);
    }
    let mut magic = [0u8; 4];
    read(source, &mut magic)?;
    if magic != MAGIC {
        log::warn!("rejecting model with magic {magic:?}");
        return Err(DiwaError::InvalidMagicNumber { found: magic });
    }
    let mut header = [0u8; HEADER_FIELDS_LEN];
    read(source, &mut header)?;
    let header = Header::from_bytes(&header);
    let topology = header.topology().inspect_err(|err| {
        log::warn!("rejecting model header {header:?}: {err}");
    })?;
    let mut weights = WeightBuffer::create(&topology)?;
    read(source, bytemuck::cast_slice_mut(weights.as_mut_slice()))?;
    nn.install(topology, weights)?;
    log::info!("loaded model {topology:?}");
    Ok(())
}

fn open_failed(path: &Path, err: io::Error) -> DiwaError {
    log::warn!("cannot open {}: {err}", path.display());
    DiwaError::StreamNotOpen
}

pub(crate) fn save_to_path(nn: &NeuralNetwork, path: &Path) -> DiwaResult<()> {
    let file = File::create(path).map_err(|err| open_failed(path, err))?;
    save(nn, &mut IoStream::open(BufWriter::new(file)))
}

pub(crate) fn load_from_path(nn: &mut NeuralNetwork, path: &Path) -> DiwaResult<()> {
    let file = File::open(path).map_err(|err| open_failed(path, err))?;
    load(nn, &mut IoStream::open(BufReader::new(file)))
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn trained_network() -> NeuralNetwork {
        let topology = Topology::new(2, 1, 3, 1);
        let mut nn = NeuralNetwork::with_topology(topology, &mut StdRng::seed_from_u64(5)).unwrap();
        nn.train(0.5, &[1.0, 0.0], &[1.0]);
        nn
    }

    fn bits(nn: &NeuralNetwork) -> Vec<u64> {
        nn.weights_as_slice().iter().map(|w| w.to_bits()).collect()
    }

    #[test]
    fn layout() {
        let nn = trained_network();
        let mut bytes = Vec::new();
        nn.save_to_file(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 4 + HEADER_FIELDS_LEN + 13 * 8);
        assert_eq!(&bytes[0..4], b"diwa");
        assert_eq!(&bytes[4..8], &[2, 0, 0, 0]); // inputs
        assert_eq!(&bytes[8..12], &[3, 0, 0, 0]); // hidden width
        assert_eq!(&bytes[12..16], &[1, 0, 0, 0]); // hidden layers
        assert_eq!(&bytes[16..20], &[1, 0, 0, 0]); // outputs
        assert_eq!(&bytes[20..24], &[13, 0, 0, 0]); // weights
        assert_eq!(&bytes[24..28], &[6, 0, 0, 0]); // neurons
        assert_eq!(&bytes[28..36], &nn.weights_as_slice()[0].to_ne_bytes());
        assert_eq!(&bytes[bytes.len() - 8..], &nn.weights_as_slice()[12].to_ne_bytes());
    }

    #[test]
    fn header_integers_are_little_endian_i32() {
        let header = Header {
            n_inputs: 0x0102_0304,
            hidden_width: -1,
            n_hidden_layers: 256,
            ..Header::default()
        };
        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], &[4, 3, 2, 1]);
        assert_eq!(&bytes[4..8], &[0xff; 4]);
        assert_eq!(&bytes[8..12], &[0, 1, 0, 0]);
        assert_eq!(Header::from_bytes(&bytes), header);
    }

    #[test]
    fn round_trip_is_bit_identical() {
        let nn = trained_network();
        let mut bytes = Vec::new();
        nn.save_to_file(&mut bytes).unwrap();

        let mut loaded = NeuralNetwork::new();
        loaded.load_from_file(&mut bytes.as_slice()).unwrap();
        assert_eq!(loaded.topology(), nn.topology());
        assert_eq!(bits(&loaded), bits(&nn));
    }

    #[test]
    fn invalid_magic_leaves_network_alone() {
        let nn = trained_network();
        let mut bytes = Vec::new();
        nn.save_to_file(&mut bytes).unwrap();
        bytes[0] = b'D';

        let mut fresh = NeuralNetwork::new();
        let err = fresh.load_from_file(&mut bytes.as_slice()).unwrap_err();
        assert!(matches!(err, DiwaError::InvalidMagicNumber { found } if &found == b"Diwa"));
        assert!(fresh.is_empty());
        assert!(fresh.weights_as_slice().is_empty());

        let mut existing = trained_network();
        let before = bits(&existing);
        let err = existing.load_from_file(&mut &b"nope"[..]).unwrap_err();
        assert!(matches!(err, DiwaError::InvalidMagicNumber { .. }));
        assert_eq!(bits(&existing), before);
        assert_eq!(*existing.topology(), Topology::new(2, 1, 3, 1));
    }

    #[test]
    fn inconsistent_counts_are_rejected() {
        let header = Header {
            n_inputs: 2,
            hidden_width: 3,
            n_hidden_layers: 1,
            n_outputs: 1,
            weight_count: 1_000_000,
            neuron_count: 6,
        };
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&header.to_bytes());
        let mut nn = NeuralNetwork::new();
        let err = nn.load_from_file(&mut bytes.as_slice()).unwrap_err();
        assert!(matches!(err, DiwaError::InvalidParamValues { .. }));
        assert!(nn.is_empty());

        let header = Header {
            n_inputs: -2,
            ..header
        };
        assert!(matches!(
            header.topology(),
            Err(DiwaError::InvalidParamValues { .. })
        ));
    }

    #[test]
    fn truncated_model_is_a_read_error() {
        let nn = trained_network();
        let mut bytes = Vec::new();
        nn.save_to_file(&mut bytes).unwrap();
        bytes.truncate(bytes.len() - 3);

        let mut existing = trained_network();
        existing.train(0.5, &[0.0, 1.0], &[0.0]);
        let before = bits(&existing);
        let err = existing.load_from_file(&mut bytes.as_slice()).unwrap_err();
        assert!(matches!(err, DiwaError::ModelReadError { .. }));
        assert_eq!(bits(&existing), before);
    }

    #[test]
    fn closed_streams_are_not_open() {
        let nn = trained_network();
        let mut sink = IoStream::<Vec<u8>>::closed();
        assert!(matches!(
            nn.save_to_file(&mut sink),
            Err(DiwaError::StreamNotOpen)
        ));
        let mut source = IoStream::<&[u8]>::closed();
        let mut nn = NeuralNetwork::new();
        assert!(matches!(
            nn.load_from_file(&mut source),
            Err(DiwaError::StreamNotOpen)
        ));
        assert!(matches!(
            nn.load_from_path("/nonexistent/dir/model.ann"),
            Err(DiwaError::StreamNotOpen)
        ));
    }

    #[test]
    fn write_failures_are_save_errors() {
        struct FullSink;
        impl ByteSink for FullSink {
            fn write_bytes(&mut self, _: &[u8]) -> io::Result<()> {
                Err(io::Error::from(io::ErrorKind::WriteZero))
            }
        }
        let nn = trained_network();
        assert!(matches!(
            nn.save_to_file(&mut FullSink),
            Err(DiwaError::ModelSaveError { .. })
        ));
    }

    #[test]
    fn empty_network_round_trips_to_empty() {
        let mut bytes = Vec::new();
        NeuralNetwork::new().save_to_file(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 4 + HEADER_FIELDS_LEN);

        let mut nn = trained_network();
        nn.load_from_file(&mut bytes.as_slice()).unwrap();
        assert!(nn.is_empty());
        assert!(nn.weights_as_slice().is_empty());
    }
}
