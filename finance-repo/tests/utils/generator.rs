use chrono::NaiveDate;
use fake::faker::lorem::en::{Sentence, Words};
use fake::{Fake, Faker};
use finance_repo::transaction_repo::{NewTransaction, TransactionType};
use rand::seq::SliceRandom;
use rust_decimal::Decimal;

pub trait Generator<T> {
    fn gen(&mut self) -> T;
}

pub struct Predefined<T> {
    values: Vec<T>,
    current_pos: usize,
}

impl<T> Predefined<T> {
    pub fn boxed(values: Vec<T>) -> Box<Predefined<T>> {
        Box::new(Predefined {
            values,
            current_pos: 0,
        })
    }
}

impl<T: Clone> Generator<T> for Predefined<T> {
    fn gen(&mut self) -> T {
        let v = self.values[self.current_pos % self.values.len()].clone();
        self.current_pos += 1;
        v
    }
}

pub struct RandomSample<T> {
    values: Vec<T>,
}

impl<T> RandomSample<T> {
    pub fn boxed(values: Vec<T>) -> Box<RandomSample<T>> {
        Box::new(RandomSample { values })
    }
}

impl<T: Clone> Generator<T> for RandomSample<T> {
    fn gen(&mut self) -> T {
        self.values.choose(&mut rand::thread_rng()).unwrap().clone()
    }
}

pub struct FakeName;

impl Generator<String> for FakeName {
    fn gen(&mut self) -> String {
        let words: Vec<String> = Words(1..4).fake();
        words.join(" ")
    }
}

pub struct FakeDescription;

impl Generator<Option<String>> for FakeDescription {
    fn gen(&mut self) -> Option<String> {
        if Faker.fake::<bool>() {
            Some(Sentence(3..8).fake())
        } else {
            None
        }
    }
}

pub struct FakeAmount;

impl Generator<Decimal> for FakeAmount {
    fn gen(&mut self) -> Decimal {
        Decimal::new((1..1_000_000i64).fake::<i64>(), 2)
    }
}

pub struct FakeDate;

impl Generator<NaiveDate> for FakeDate {
    fn gen(&mut self) -> NaiveDate {
        Faker.fake()
    }
}

#[allow(dead_code)]
pub struct NewTransactionGenerator {
    name_gen: Box<dyn Generator<String>>,
    type_gen: Box<dyn Generator<TransactionType>>,
    amnt_gen: Box<dyn Generator<Decimal>>,
    date_gen: Box<dyn Generator<NaiveDate>>,
    desc_gen: Box<dyn Generator<Option<String>>>,
}

#[allow(dead_code)]
impl NewTransactionGenerator {
    pub fn with_types(mut self, types: Vec<TransactionType>) -> NewTransactionGenerator {
        self.type_gen = Predefined::boxed(types);
        self
    }

    pub fn with_amounts(mut self, amounts: Vec<Decimal>) -> NewTransactionGenerator {
        self.amnt_gen = Predefined::boxed(amounts);
        self
    }

    pub fn generate(&mut self) -> NewTransaction {
        NewTransaction::new(
            self.name_gen.gen(),
            self.type_gen.gen(),
            self.amnt_gen.gen(),
            self.date_gen.gen(),
            self.desc_gen.gen(),
        )
    }

    pub fn generate_many(&mut self, count: usize) -> Vec<NewTransaction> {
        (0..count).map(|_| self.generate()).collect()
    }
}

impl Default for NewTransactionGenerator {
    fn default() -> Self {
        NewTransactionGenerator {
            name_gen: Box::new(FakeName),
            type_gen: RandomSample::boxed(TransactionType::ALL.to_vec()),
            amnt_gen: Box::new(FakeAmount),
            date_gen: Box::new(FakeDate),
            desc_gen: Box::new(FakeDescription),
        }
    }
}
